//! HTTP client for the Drata public API

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::PlatformConfig;
use crate::error::TransportError;
use crate::platform::{CompliancePlatform, PlatformResult};
use crate::roster::Roster;

const PERSONNEL_PATH: &str = "/api/personnel";
const EVIDENCE_PATH: &str = "/api/evidence";

/// reqwest-backed [`CompliancePlatform`]
pub struct DrataClient {
    config: PlatformConfig,
    http_client: reqwest::Client,
}

impl DrataClient {
    /// Create a client from explicit settings
    pub fn new(config: PlatformConfig) -> PlatformResult<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("lms-evidence/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(DrataClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn autopilot_path(test_id: u32) -> String {
        format!("/api/autopilot/tests/{}/run", test_id)
    }

    /// Turn a non-success status into [`TransportError::Status`]
    async fn check_status(endpoint: &str, response: Response) -> PlatformResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a JSON body; an empty body is `null`
    async fn read_json(endpoint: &str, response: Response) -> PlatformResult<Value> {
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::request(endpoint, e))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::decode(endpoint, e))
    }
}

#[async_trait]
impl CompliancePlatform for DrataClient {
    async fn fetch_roster(&self) -> PlatformResult<Roster> {
        let url = self.config.endpoint(PERSONNEL_PATH);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| TransportError::request(PERSONNEL_PATH, e))?;
        let response = Self::check_status(PERSONNEL_PATH, response).await?;
        let body = Self::read_json(PERSONNEL_PATH, response).await?;

        let roster = Roster::from_response(&body)
            .map_err(|e| TransportError::decode(PERSONNEL_PATH, e))?;
        debug!(personnel = roster.len(), "roster fetched");
        Ok(roster)
    }

    async fn upload_evidence(
        &self,
        personnel_id: &str,
        control_id: &str,
        file_path: &Path,
    ) -> PlatformResult<Value> {
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|source| TransportError::Io {
                path: file_path.to_path_buf(),
                source,
            })?;
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.pdf", personnel_id));

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| TransportError::request(EVIDENCE_PATH, e))?;
        let form = Form::new()
            .part("file", part)
            .text("personnelId", personnel_id.to_string())
            .text("controlId", control_id.to_string());

        let url = self.config.endpoint(EVIDENCE_PATH);
        debug!("POST {} personnelId={} controlId={}", url, personnel_id, control_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::request(EVIDENCE_PATH, e))?;
        let response = Self::check_status(EVIDENCE_PATH, response).await?;
        Self::read_json(EVIDENCE_PATH, response).await
    }

    async fn run_autopilot_test(&self, test_id: u32) -> PlatformResult<Value> {
        let path = Self::autopilot_path(test_id);
        let url = self.config.endpoint(&path);
        info!("Running autopilot test {}", test_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| TransportError::request(&path, e))?;
        let response = Self::check_status(&path, response).await?;
        Self::read_json(&path, response).await
    }
}
