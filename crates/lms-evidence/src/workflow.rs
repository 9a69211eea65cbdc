//! Reconciliation workflow
//!
//! Runs one linear pass:
//!
//! ```text
//! READ_COMPLETIONS -> FETCH_ROSTER -> RECONCILE -> (GENERATE + UPLOAD)*
//!     -> TRIGGER_AUTOPILOT -> FETCH_ROSTER -> VALIDATE
//! ```
//!
//! Upload failures are recorded per user and the loop moves on. Every other
//! failure aborts the run.

use std::path::{Path, PathBuf};

use drata_client::{CompliancePlatform, PlatformConfig, Roster, TransportError};
use serde::Serialize;
use tracing::{info, warn};

use crate::certificate::generate_certificate;
use crate::completions::read_completions;
use crate::error::{Result, WorkflowError};
use crate::reconcile::MatchSets;

/// Autopilot test run after evidence upload
pub const AUTOPILOT_TEST_ID: u32 = 43;

/// Inputs of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// LMS export listing users who completed the training
    pub lms_json: PathBuf,
    /// Control the evidence is attached to
    pub control_id: String,
    /// Directory receiving one certificate per matched user
    pub pdf_dir: PathBuf,
}

/// An upload that was attempted and rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub email: String,
    pub personnel_id: String,
    pub reason: String,
}

/// Roster visibility of uploaded emails after the autopilot run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Uploaded emails still present on the roster
    pub present: Vec<String>,
    /// Uploaded emails no longer on the roster
    pub missing: Vec<String>,
}

impl ValidationReport {
    pub fn compute(uploaded: &[String], roster: &Roster) -> Self {
        let (present, missing) = uploaded
            .iter()
            .cloned()
            .partition(|email| roster.contains(email));
        ValidationReport { present, missing }
    }

    /// Warning text when uploaded emails went missing
    pub fn warning(&self) -> Option<String> {
        if self.missing.is_empty() {
            None
        } else {
            Some(format!(
                "The following emails were not found in Drata after upload: {:?}",
                self.missing
            ))
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub matches: MatchSets,
    /// Emails whose evidence upload succeeded, in upload order
    pub uploaded: Vec<String>,
    pub failed_uploads: Vec<UploadFailure>,
    /// Matched emails that were not uploaded because their roster record
    /// has no usable id, or an id that cannot name a file in the output
    /// directory
    pub skipped: Vec<String>,
    pub validation: ValidationReport,
}

/// Drives one run against a platform
pub struct EvidenceWorkflow<'a> {
    platform: &'a dyn CompliancePlatform,
    test_id: u32,
}

impl<'a> EvidenceWorkflow<'a> {
    pub fn new(platform: &'a dyn CompliancePlatform) -> Self {
        EvidenceWorkflow {
            platform,
            test_id: AUTOPILOT_TEST_ID,
        }
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunReport> {
        let completions = read_completions(&request.lms_json)?;
        info!(
            completions = completions.len(),
            "Read LMS export {:?}", request.lms_json
        );

        let roster = self.platform.fetch_roster().await?;
        info!(personnel = roster.len(), "Fetched personnel roster");

        let matches = MatchSets::compute(&roster, &completions);
        info!(
            completed = matches.completed.len(),
            not_completed = matches.not_completed.len(),
            unmatched = matches.unmatched_completions.len(),
            "Reconciled roster against completions"
        );

        let mut report = RunReport {
            matches,
            ..RunReport::default()
        };

        std::fs::create_dir_all(&request.pdf_dir).map_err(|source| WorkflowError::Filesystem {
            path: request.pdf_dir.clone(),
            source,
        })?;

        for email in &report.matches.completed {
            let Some(personnel_id) = roster.get(email).and_then(|p| p.id.clone()) else {
                warn!(email = %email, "Skipping user: personnel record has no id");
                report.skipped.push(email.clone());
                continue;
            };
            let Some(pdf_path) = certificate_path(&request.pdf_dir, &personnel_id) else {
                warn!(
                    email = %email,
                    personnel_id = %personnel_id,
                    "Skipping user: personnel id is not a safe file name"
                );
                report.skipped.push(email.clone());
                continue;
            };

            generate_certificate(email, &pdf_path)?;

            info!("Uploading evidence for {} (ID: {})...", email, personnel_id);
            match self
                .platform
                .upload_evidence(&personnel_id, &request.control_id, &pdf_path)
                .await
            {
                Ok(_) => report.uploaded.push(email.clone()),
                Err(e) => {
                    warn!(
                        email = %email,
                        personnel_id = %personnel_id,
                        "Failed to upload evidence: {}", e
                    );
                    report.failed_uploads.push(UploadFailure {
                        email: email.clone(),
                        personnel_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Running Autopilot test {}...", self.test_id);
        self.platform.run_autopilot_test(self.test_id).await?;

        info!("Validating evidence upload...");
        let roster_after = self.platform.fetch_roster().await?;
        report.validation = ValidationReport::compute(&report.uploaded, &roster_after);
        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed_uploads.len(),
            skipped = report.skipped.len(),
            present = report.validation.present.len(),
            missing = report.validation.missing.len(),
            "Validated evidence upload"
        );

        Ok(report)
    }
}

/// Certificate location for a personnel id.
///
/// Returns `None` when the id would not resolve to a file directly inside
/// `pdf_dir`: empty, `.`, `..`, or containing a path separator or NUL.
pub fn certificate_path(pdf_dir: &Path, personnel_id: &str) -> Option<PathBuf> {
    let unsafe_id = personnel_id.is_empty()
        || personnel_id == "."
        || personnel_id == ".."
        || personnel_id.contains(['/', '\\'])
        || personnel_id.contains('\0');
    if unsafe_id {
        return None;
    }
    Some(pdf_dir.join(format!("{}.pdf", personnel_id)))
}

/// Resolve configuration, connect, and run.
///
/// The credential is checked before the LMS export is read or `connect`
/// is called, so a missing credential never reaches the network.
pub async fn launch<L, C, P>(lookup: L, request: &RunRequest, connect: C) -> Result<RunReport>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(PlatformConfig) -> std::result::Result<P, TransportError>,
    P: CompliancePlatform,
{
    let config = PlatformConfig::from_lookup(lookup)?;
    let platform = connect(config)?;
    EvidenceWorkflow::new(&platform).run(request).await
}
