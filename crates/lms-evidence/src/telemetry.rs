//! Tracing initialisation for the `lms-evidence` binary.
//!
//! Log lines carry run progress and per-user upload failures and skips.
//! They are written to stderr so stdout holds only the final report the
//! binary prints, and the two can be redirected separately.

use std::io;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: `level` for the workflow crates,
/// warnings only for everything else (HTTP and TLS internals).
fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!(
        "warn,lms_evidence={level},drata_client={level}",
        level = level.as_str().to_lowercase()
    ))
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. With `json` set, log lines are
/// newline-delimited JSON. Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let layer = fmt::layer().with_writer(io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(layer.json()).try_init().ok();
    } else {
        registry.with(layer).try_init().ok();
    }
}
