//! stderr tracing for the CLI, filtered by the TRACE env var.
//!
//! TRACE takes tracing_subscriber's EnvFilter syntax. For example:
//!
//!   TRACE=acb_ledger=info
//!   TRACE=info,acb_ledger::portfolio::bookkeeping=trace
//!
//! Nothing is emitted when TRACE is unset.

use time::macros::format_description;
use tracing_subscriber::{fmt, EnvFilter, FmtSubscriber};

const TRACE_ENV_VAR: &str = "TRACE";

pub fn setup_tracing() {
    let timer = fmt::time::UtcTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:5]Z"
    ));

    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_env(TRACE_ENV_VAR))
        .with_timer(timer)
        .with_target(true)
        .finish();

    // May already be set (eg. by tests).
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Adds a directive to TRACE, keeping whatever the user already set.
/// Must be called before setup_tracing.
pub fn enable_trace_env(directive: &str) {
    let value = match std::env::var(TRACE_ENV_VAR) {
        Ok(existing) if !existing.is_empty() => format!("{existing},{directive}"),
        _ => directive.to_string(),
    };
    std::env::set_var(TRACE_ENV_VAR, value);
}
