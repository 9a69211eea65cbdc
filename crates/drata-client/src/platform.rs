//! The compliance platform seam
//!
//! - roster reads (`GET /api/personnel`)
//! - evidence uploads (`POST /api/evidence`)
//! - autopilot test runs (`POST /api/autopilot/tests/{id}/run`)
//!
//! [`crate::DrataClient`] talks HTTP; [`crate::fakes::FakeCompliancePlatform`]
//! keeps everything in memory for tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::roster::Roster;

/// Result type for platform operations
pub type PlatformResult<T> = std::result::Result<T, TransportError>;

/// Operations the evidence workflow needs from the compliance platform.
///
/// No method retries; every failure is reported to the caller as-is.
#[async_trait]
pub trait CompliancePlatform: Send + Sync {
    /// Fetch a fresh snapshot of the personnel roster.
    async fn fetch_roster(&self) -> PlatformResult<Roster>;

    /// Upload the file at `file_path` as evidence for a personnel/control
    /// pair. Returns the platform's JSON response.
    async fn upload_evidence(
        &self,
        personnel_id: &str,
        control_id: &str,
        file_path: &Path,
    ) -> PlatformResult<Value>;

    /// Trigger an autopilot test run. Returns the platform's JSON response.
    async fn run_autopilot_test(&self, test_id: u32) -> PlatformResult<Value>;
}

#[async_trait]
impl<T: CompliancePlatform + ?Sized> CompliancePlatform for Arc<T> {
    async fn fetch_roster(&self) -> PlatformResult<Roster> {
        (**self).fetch_roster().await
    }

    async fn upload_evidence(
        &self,
        personnel_id: &str,
        control_id: &str,
        file_path: &Path,
    ) -> PlatformResult<Value> {
        (**self)
            .upload_evidence(personnel_id, control_id, file_path)
            .await
    }

    async fn run_autopilot_test(&self, test_id: u32) -> PlatformResult<Value> {
        (**self).run_autopilot_test(test_id).await
    }
}
