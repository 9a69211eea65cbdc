//! LMS Evidence: training-completion evidence for Drata
//!
//! Reads an LMS completion export, reconciles it against the Drata
//! personnel roster, uploads one completion certificate per matched user
//! as evidence for a control, triggers the autopilot test and checks that
//! uploaded users are still on the roster afterwards.

pub mod certificate;
pub mod completions;
pub mod error;
pub mod reconcile;
pub mod telemetry;
pub mod workflow;

pub use certificate::generate_certificate;
pub use completions::{parse_completions, read_completions, CompletionSet, LmsDocument};
pub use error::{CertificateError, FormatError, Result, WorkflowError};
pub use reconcile::MatchSets;
pub use telemetry::init_tracing;
pub use workflow::{
    launch, EvidenceWorkflow, RunReport, RunRequest, UploadFailure, ValidationReport,
    AUTOPILOT_TEST_ID,
};
