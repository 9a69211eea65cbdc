//! End-to-end workflow scenarios against the in-memory platform fake.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use drata_client::fakes::{FakeCompliancePlatform, PlatformCall};
use drata_client::{ConfigError, PersonnelRecord, Roster, API_KEY_ENV};
use lms_evidence::{
    launch, CertificateError, EvidenceWorkflow, RunRequest, WorkflowError, AUTOPILOT_TEST_ID,
};
use tempfile::TempDir;

fn roster_of(entries: &[(&str, &str)]) -> Roster {
    Roster::from_records(entries.iter().map(|(id, email)| PersonnelRecord {
        id: Some(id.to_string()),
        email: email.to_string(),
        fields: Default::default(),
    }))
}

fn request_with(dir: &TempDir, lms: &str) -> RunRequest {
    let lms_json = dir.path().join("lms.json");
    std::fs::write(&lms_json, lms).unwrap();
    RunRequest {
        lms_json,
        control_id: "CTRL-7".to_string(),
        pdf_dir: dir.path().join("pdfs"),
    }
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn completed_user_gets_certificate_and_upload() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"{"completed": ["a@x.com", "b@x.com"]}"#);
    let platform = FakeCompliancePlatform::new()
        .with_roster(roster_of(&[("1", "a@x.com"), ("2", "c@x.com")]));

    let report = EvidenceWorkflow::new(&platform).run(&request).await.unwrap();

    assert_eq!(report.matches.completed, set(&["a@x.com"]));
    assert_eq!(report.matches.not_completed, set(&["c@x.com"]));
    assert_eq!(report.matches.unmatched_completions, set(&["b@x.com"]));
    assert_eq!(report.uploaded, vec!["a@x.com"]);
    assert_eq!(report.validation.present, vec!["a@x.com"]);
    assert!(report.validation.warning().is_none());
    assert!(request.pdf_dir.join("1.pdf").is_file());
    assert!(!request.pdf_dir.join("2.pdf").exists());

    assert_eq!(
        platform.calls(),
        vec![
            PlatformCall::FetchRoster,
            PlatformCall::UploadEvidence {
                personnel_id: "1".to_string(),
                control_id: "CTRL-7".to_string(),
                file_path: request.pdf_dir.join("1.pdf"),
            },
            PlatformCall::RunAutopilotTest {
                test_id: AUTOPILOT_TEST_ID
            },
            PlatformCall::FetchRoster,
        ]
    );
}

#[tokio::test]
async fn mixed_case_completions_match_roster() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["A@X.com", {"email": "B@x.com"}]"#);
    let platform =
        FakeCompliancePlatform::new().with_roster(roster_of(&[("1", "a@x.com"), ("2", "b@X.com")]));

    let report = EvidenceWorkflow::new(&platform).run(&request).await.unwrap();

    assert_eq!(report.matches.completed, set(&["a@x.com", "b@x.com"]));
    assert_eq!(report.uploaded, vec!["a@x.com", "b@x.com"]);
}

#[tokio::test]
async fn failed_upload_is_isolated_and_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com", "b@x.com"]"#);
    let platform = FakeCompliancePlatform::new()
        .with_roster(roster_of(&[("1", "a@x.com"), ("2", "b@x.com")]))
        .failing_upload("1");

    let report = EvidenceWorkflow::new(&platform).run(&request).await.unwrap();

    assert_eq!(platform.uploaded_ids(), vec!["1", "2"]);
    assert_eq!(report.uploaded, vec!["b@x.com"]);
    assert_eq!(report.failed_uploads.len(), 1);
    assert_eq!(report.failed_uploads[0].email, "a@x.com");
    assert!(report.failed_uploads[0].reason.contains("500"));
    assert_eq!(report.validation.present, vec!["b@x.com"]);
    assert!(platform
        .calls()
        .contains(&PlatformCall::RunAutopilotTest { test_id: 43 }));
}

#[tokio::test]
async fn user_missing_after_upload_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"{"emails": ["a@x.com", "b@x.com"]}"#);
    let platform = FakeCompliancePlatform::new()
        .with_roster(roster_of(&[("1", "a@x.com"), ("2", "b@x.com")]))
        .with_roster(roster_of(&[("1", "a@x.com")]));

    let report = EvidenceWorkflow::new(&platform).run(&request).await.unwrap();

    assert_eq!(report.uploaded, vec!["a@x.com", "b@x.com"]);
    assert_eq!(report.validation.present, vec!["a@x.com"]);
    assert_eq!(report.validation.missing, vec!["b@x.com"]);
    let warning = report.validation.warning().unwrap();
    assert!(warning.contains("b@x.com"));
}

#[tokio::test]
async fn autopilot_failure_aborts_after_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com"]"#);
    let platform = FakeCompliancePlatform::new()
        .with_roster(roster_of(&[("1", "a@x.com")]))
        .failing_autopilot(502);

    let err = EvidenceWorkflow::new(&platform)
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Transport(_)));
    assert_eq!(platform.uploaded_ids(), vec!["1"]);
    // no validation fetch after the failed trigger
    let fetches = platform
        .calls()
        .into_iter()
        .filter(|c| *c == PlatformCall::FetchRoster)
        .count();
    assert_eq!(fetches, 1);
}

#[tokio::test]
async fn bad_lms_document_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"{"foo": [1, 2, 3]}"#);
    let platform = FakeCompliancePlatform::new().with_roster(roster_of(&[("1", "a@x.com")]));

    let err = EvidenceWorkflow::new(&platform)
        .run(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Format(_)));
    assert_eq!(platform.call_count(), 0);
    assert!(!request.pdf_dir.exists());
}

#[tokio::test]
async fn roster_failure_is_fatal_before_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com"]"#);
    let platform = FakeCompliancePlatform::new().failing_roster(401);

    let err = EvidenceWorkflow::new(&platform)
        .run(&request)
        .await
        .unwrap_err();

    match err {
        WorkflowError::Transport(e) => assert_eq!(e.status(), Some(401)),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(platform.calls(), vec![PlatformCall::FetchRoster]);
}

#[tokio::test]
async fn unwritable_output_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = request_with(&dir, r#"["a@x.com"]"#);
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    request.pdf_dir = blocker.join("pdfs");
    let platform = FakeCompliancePlatform::new().with_roster(roster_of(&[("1", "a@x.com")]));

    let err = EvidenceWorkflow::new(&platform)
        .run(&request)
        .await
        .unwrap_err();

    match &err {
        WorkflowError::Filesystem { path, .. } => assert_eq!(path, &request.pdf_dir),
        other => panic!("expected filesystem error, got {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
    assert!(platform.uploaded_ids().is_empty());
}

#[tokio::test]
async fn unwritable_certificate_keeps_io_cause() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com"]"#);
    std::fs::create_dir_all(request.pdf_dir.join("1.pdf")).unwrap();
    let platform = FakeCompliancePlatform::new().with_roster(roster_of(&[("1", "a@x.com")]));

    let err = EvidenceWorkflow::new(&platform)
        .run(&request)
        .await
        .unwrap_err();

    match &err {
        WorkflowError::Certificate(CertificateError::Write { path, .. }) => {
            assert_eq!(path, &request.pdf_dir.join("1.pdf"))
        }
        other => panic!("expected certificate write error, got {other:?}"),
    }
    let cause = std::error::Error::source(&err).unwrap();
    assert!(cause.is::<CertificateError>());
    let io_cause = std::error::Error::source(cause).unwrap();
    assert!(io_cause.downcast_ref::<std::io::Error>().is_some());
    assert!(platform.uploaded_ids().is_empty());
}

#[tokio::test]
async fn personnel_id_that_escapes_output_dir_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com", "b@x.com"]"#);
    let platform = FakeCompliancePlatform::new()
        .with_roster(roster_of(&[("../evil", "a@x.com"), ("2", "b@x.com")]));

    let report = EvidenceWorkflow::new(&platform).run(&request).await.unwrap();

    assert_eq!(report.skipped, vec!["a@x.com"]);
    assert_eq!(report.uploaded, vec!["b@x.com"]);
    assert_eq!(platform.uploaded_ids(), vec!["2"]);
    assert!(!dir.path().join("evil.pdf").exists());
    let written: Vec<_> = std::fs::read_dir(&request.pdf_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(written, vec![std::ffi::OsString::from("2.pdf")]);
}

#[tokio::test]
async fn personnel_without_id_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com", "b@x.com"]"#);
    let mut roster = roster_of(&[("2", "b@x.com")]);
    roster.insert(PersonnelRecord {
        id: None,
        email: "a@x.com".to_string(),
        fields: Default::default(),
    });
    let platform = FakeCompliancePlatform::new().with_roster(roster);

    let report = EvidenceWorkflow::new(&platform).run(&request).await.unwrap();

    assert_eq!(report.skipped, vec!["a@x.com"]);
    assert_eq!(report.uploaded, vec!["b@x.com"]);
    assert_eq!(platform.uploaded_ids(), vec!["2"]);
}

#[tokio::test]
async fn missing_credential_makes_no_platform_calls() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com"]"#);
    let platform =
        Arc::new(FakeCompliancePlatform::new().with_roster(roster_of(&[("1", "a@x.com")])));
    let connected = Cell::new(false);

    let err = launch(|_| None, &request, |_config| {
        connected.set(true);
        Ok(Arc::clone(&platform))
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Environment(ConfigError::MissingCredential { .. })
    ));
    assert!(!connected.get());
    assert_eq!(platform.call_count(), 0);
    assert!(!request.pdf_dir.exists());
}

#[tokio::test]
async fn launch_with_credential_runs_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let request = request_with(&dir, r#"["a@x.com"]"#);
    let platform =
        Arc::new(FakeCompliancePlatform::new().with_roster(roster_of(&[("1", "a@x.com")])));

    let report = launch(
        |key| (key == API_KEY_ENV).then(|| "secret".to_string()),
        &request,
        |config| {
            assert_eq!(config.api_key, "secret");
            Ok(Arc::clone(&platform))
        },
    )
    .await
    .unwrap();

    assert_eq!(report.uploaded, vec!["a@x.com"]);
    assert!(Path::new(&request.pdf_dir.join("1.pdf")).is_file());
}
