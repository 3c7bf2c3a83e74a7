//! Shared configuration for the inspector protocol tooling.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a TOML file
//! (discovered or named with `--config-path`), then `INSPECTOR_*` environment
//! variables, then command-line flags. Later layers win.

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_RESPONSE_TIMEOUT_SECS, default_log_filter,
    default_log_filter_string, default_log_format, default_response_timeout_secs,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime settings for the protocol client and its front end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "INSPECTOR")]
pub struct Config {
    /// `tracing` filter expression, for example `inspector_protocol=debug`.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log events.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// External command catalog; the embedded catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<Utf8PathBuf>,
    /// Logs the full text of every outbound and inbound protocol message.
    ///
    /// Set from the file or environment layers; `inspector call` also has a
    /// `--dump-protocol-messages` switch.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub dump_protocol_messages: bool,
    /// Seconds to wait for the next backend message before giving up.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            catalog_path: None,
            dump_protocol_messages: false,
            response_timeout_secs: default_response_timeout_secs(),
        }
    }
}

impl Config {
    /// Filter expression handed to the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Selected log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Path of the external catalog, if one is configured.
    #[must_use]
    pub fn catalog_path(&self) -> Option<&Utf8Path> {
        self.catalog_path.as_deref()
    }

    /// Whether message text is logged in full.
    #[must_use]
    pub const fn dump_protocol_messages(&self) -> bool {
        self.dump_protocol_messages
    }

    /// Backend read timeout in seconds.
    #[must_use]
    pub const fn response_timeout_secs(&self) -> u64 {
        self.response_timeout_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_embedded_catalog() {
        let config = Config::default();
        assert!(config.catalog_path().is_none());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(!config.dump_protocol_messages());
        assert_eq!(config.response_timeout_secs(), DEFAULT_RESPONSE_TIMEOUT_SECS);
    }
}
