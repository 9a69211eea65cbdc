//! In-memory fake of the compliance platform (testing only)
//!
//! `FakeCompliancePlatform` serves scripted roster snapshots, can be told
//! to fail particular uploads or the autopilot trigger, and records every
//! call so tests can assert on call order and counts.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::platform::{CompliancePlatform, PlatformResult};
use crate::roster::Roster;

/// One recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    FetchRoster,
    UploadEvidence {
        personnel_id: String,
        control_id: String,
        file_path: PathBuf,
    },
    RunAutopilotTest {
        test_id: u32,
    },
}

#[derive(Debug, Default)]
struct FakeState {
    rosters: VecDeque<Roster>,
    last_roster: Roster,
    roster_failure: Option<u16>,
    failing_uploads: HashSet<String>,
    autopilot_failure: Option<u16>,
    calls: Vec<PlatformCall>,
}

/// Scripted in-memory platform.
///
/// Roster snapshots are served in the order they were queued; once the
/// queue is drained the last snapshot is repeated.
#[derive(Debug, Default)]
pub struct FakeCompliancePlatform {
    state: Mutex<FakeState>,
}

impl FakeCompliancePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a roster snapshot for the next `fetch_roster`
    pub fn with_roster(self, roster: Roster) -> Self {
        self.state.lock().unwrap().rosters.push_back(roster);
        self
    }

    /// Make every `fetch_roster` fail with the given status
    pub fn failing_roster(self, status: u16) -> Self {
        self.state.lock().unwrap().roster_failure = Some(status);
        self
    }

    /// Make uploads for `personnel_id` fail with HTTP 500
    pub fn failing_upload(self, personnel_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_uploads
            .insert(personnel_id.to_string());
        self
    }

    /// Make the autopilot trigger fail with the given status
    pub fn failing_autopilot(self, status: u16) -> Self {
        self.state.lock().unwrap().autopilot_failure = Some(status);
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Personnel ids of the upload calls made so far
    pub fn uploaded_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::UploadEvidence { personnel_id, .. } => Some(personnel_id),
                _ => None,
            })
            .collect()
    }

    fn status_error(endpoint: &str, status: u16) -> TransportError {
        TransportError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: "fake failure".to_string(),
        }
    }
}

#[async_trait]
impl CompliancePlatform for FakeCompliancePlatform {
    async fn fetch_roster(&self) -> PlatformResult<Roster> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::FetchRoster);

        if let Some(status) = state.roster_failure {
            return Err(Self::status_error("/api/personnel", status));
        }
        if let Some(next) = state.rosters.pop_front() {
            state.last_roster = next;
        }
        Ok(state.last_roster.clone())
    }

    async fn upload_evidence(
        &self,
        personnel_id: &str,
        control_id: &str,
        file_path: &Path,
    ) -> PlatformResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::UploadEvidence {
            personnel_id: personnel_id.to_string(),
            control_id: control_id.to_string(),
            file_path: file_path.to_path_buf(),
        });

        if state.failing_uploads.contains(personnel_id) {
            return Err(Self::status_error("/api/evidence", 500));
        }
        Ok(json!({ "personnelId": personnel_id, "controlId": control_id }))
    }

    async fn run_autopilot_test(&self, test_id: u32) -> PlatformResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::RunAutopilotTest { test_id });

        if let Some(status) = state.autopilot_failure {
            return Err(Self::status_error(
                &format!("/api/autopilot/tests/{}/run", test_id),
                status,
            ));
        }
        Ok(json!({ "testId": test_id, "status": "queued" }))
    }
}
