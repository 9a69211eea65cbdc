//! Error types for drata-client

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the compliance platform
#[derive(Error, Debug)]
pub enum TransportError {
    /// The platform answered with a non-success status
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The request could not be completed (connect, TLS, timeout, ...)
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    /// The response body was not the JSON shape we expected
    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The HTTP client itself could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The evidence file could not be read for upload
    #[error("failed to read evidence file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    pub(crate) fn request(endpoint: &str, err: reqwest::Error) -> Self {
        TransportError::Request {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(endpoint: &str, message: impl ToString) -> Self {
        TransportError::Decode {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    /// HTTP status code, when the platform answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A personnel response body that does not have the expected shape
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RosterError {
    /// The body is not a JSON object
    #[error("expected a JSON object")]
    NotAnObject,

    /// `data` is present but not an array
    #[error("`data` is not an array")]
    DataNotArray,
}

/// Errors raised while assembling [`crate::PlatformConfig`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The API credential variable is unset or empty
    #[error("{var} environment variable not set")]
    MissingCredential { var: String },

    /// The timeout variable is not a positive number of seconds
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: String, value: String },
}
