//! Error types for the evidence workflow

use std::path::PathBuf;

use drata_client::{ConfigError, TransportError};
use thiserror::Error;

/// The LMS export could not be turned into a completion set
#[derive(Error, Debug)]
pub enum FormatError {
    /// The export file could not be read
    #[error("failed to read LMS export {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export is not valid JSON
    #[error("LMS export is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// An object document without a usable list under a known key
    #[error("could not locate a list of completed users")]
    MissingUserList,

    /// A top-level value that is neither an array nor an object
    #[error("unrecognized LMS document format")]
    UnrecognizedDocument,

    /// One entry of the user list is unusable
    #[error("malformed LMS entry at index {index}: {reason}")]
    MalformedEntry { index: usize, reason: String },
}

/// A certificate could not be written
#[derive(Error, Debug)]
pub enum CertificateError {
    /// The PDF content stream could not be encoded
    #[error("failed to encode certificate content: {0}")]
    Encode(String),

    /// The PDF could not be written to disk
    #[error("failed to write certificate {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors that abort a workflow run
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Required configuration is missing or invalid
    #[error("environment error: {0}")]
    Environment(#[from] ConfigError),

    /// The LMS export is unusable
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A fatal platform call failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The output directory could not be created
    #[error("failed to create output directory {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A certificate could not be written
    #[error("certificate error: {0}")]
    Certificate(#[from] CertificateError),
}

/// Result type for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
