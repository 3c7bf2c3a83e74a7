//! Structured telemetry for the CLI.
//!
//! Events go to stderr so stdout carries command output only. The configured
//! filter is widened for two protocol targets: reported protocol errors on
//! [`DIAGNOSTICS_TARGET`] are always kept at `error`, and message dumps on
//! [`CLIENT_TARGET`] are lifted to `info` when dumping is requested. Either
//! adjustment is skipped when the configured filter already names the target.

use std::io::{self, IsTerminal};

use inspector_config::{Config, LogFormat};
use inspector_protocol::{CLIENT_TARGET, DIAGNOSTICS_TARGET};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Builds the filter directives for a run.
///
/// Starts from `configured` and appends a directive per protocol target the
/// run needs, unless `configured` mentions that target itself.
#[must_use]
pub fn filter_directives(configured: &str, dump_messages: bool) -> String {
    let mut directives: Vec<String> = configured
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .map(str::to_owned)
        .collect();
    let mut ensure = |target: &str, level: &str| {
        if !directives.iter().any(|directive| directive.starts_with(target)) {
            directives.push(format!("{target}={level}"));
        }
    };
    ensure(DIAGNOSTICS_TARGET, "error");
    if dump_messages {
        ensure(CLIENT_TARGET, "info");
    }
    directives.join(",")
}

/// Configures the global tracing subscriber on first use.
///
/// Later calls return a fresh [`TelemetryHandle`] without touching the
/// installed subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] if another subscriber is already global.
pub fn initialise(config: &Config, dump_messages: bool) -> Result<TelemetryHandle, TelemetryError> {
    let directives = filter_directives(config.log_filter(), dump_messages);
    let filter =
        EnvFilter::try_new(&directives).map_err(|error| TelemetryError::Filter(error.to_string()))?;
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(filter, config.log_format()))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(filter: EnvFilter, format: LogFormat) -> Result<(), TelemetryError> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::quiet_run("warn", false, "warn,inspector_protocol::diagnostics=error")]
    #[case::dumping_run(
        "warn",
        true,
        "warn,inspector_protocol::diagnostics=error,inspector_protocol::client=info"
    )]
    #[case::empty_filter("", false, "inspector_protocol::diagnostics=error")]
    #[case::named_targets_win(
        "inspector_protocol::diagnostics=off, inspector_protocol::client=trace",
        true,
        "inspector_protocol::diagnostics=off,inspector_protocol::client=trace"
    )]
    fn widens_filter_for_protocol_targets(
        #[case] configured: &str,
        #[case] dump_messages: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(filter_directives(configured, dump_messages), expected);
    }

    #[test]
    fn invalid_filter_is_rejected_before_installation() {
        let config = Config {
            log_filter: "inspector=loud".to_owned(),
            ..Config::default()
        };
        let error = initialise(&config, false).expect_err("bad filter");
        assert!(matches!(error, TelemetryError::Filter(_)));
    }

    #[test]
    fn repeated_initialisation_is_idempotent() {
        let config = Config::default();
        initialise(&config, true).expect("first initialisation");
        initialise(&config, false).expect("second initialisation");
    }
}
