//! LMS Evidence CLI
//!
//! `lms-evidence <LMS_JSON> <CONTROL_ID> <PDF_DIR>` reconciles an LMS
//! completion export against the Drata roster, uploads one completion
//! certificate per matched user, runs the autopilot test and reports
//! which uploaded users are still on the roster.
//!
//! The API credential is read from `DRATA_API_KEY`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use drata_client::DrataClient;
use lms_evidence::{launch, RunReport, RunRequest};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "lms-evidence")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drata LMS Evidence Automation", long_about = None)]
struct Cli {
    /// Path to LMS JSON file (or response) with user emails who completed training
    lms_json: PathBuf,

    /// Drata control ID to associate with the evidence
    control_id: String,

    /// Directory to store generated PDFs
    pdf_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn request(&self) -> RunRequest {
        RunRequest {
            lms_json: self.lms_json.clone(),
            control_id: self.control_id.clone(),
            pdf_dir: self.pdf_dir.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    lms_evidence::init_tracing(cli.json, level);

    let report = launch(|key| std::env::var(key).ok(), &cli.request(), DrataClient::new)
        .await
        .context("LMS evidence run failed")?;

    print_report(&report);
    Ok(())
}

/// Final results for stdout. Progress and per-user failure reasons are
/// logged to stderr while the run progresses and are only counted here.
fn render_report(report: &RunReport) -> Vec<String> {
    let mut lines = vec![
        format!("Users who have completed training: {:?}", report.matches.completed),
        format!(
            "Users who have NOT completed training: {:?}",
            report.matches.not_completed
        ),
    ];
    if !report.matches.unmatched_completions.is_empty() {
        lines.push(format!(
            "Completions with no Drata personnel record: {:?}",
            report.matches.unmatched_completions
        ));
    }
    lines.push(format!(
        "Evidence uploaded: {}, failed: {}, skipped: {}",
        report.uploaded.len(),
        report.failed_uploads.len(),
        report.skipped.len()
    ));
    lines.push(format!(
        "Emails with evidence uploaded and present in Drata: {:?}",
        report.validation.present
    ));
    match report.validation.warning() {
        Some(warning) => lines.push(format!("WARNING: {}", warning)),
        None => lines.push("All uploaded emails are present in Drata.".to_string()),
    }
    lines
}

fn print_report(report: &RunReport) {
    for line in render_report(report) {
        println!("{}", line);
    }
}
