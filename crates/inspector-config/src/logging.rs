//! Log output selection shared by the protocol client binaries.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How diagnostic and traffic logs are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, flattened for log shippers.
    Json,
    /// Single-line human-readable output.
    #[default]
    Compact,
}

/// Error returned when a [`LogFormat`] cannot be parsed from text.
pub type LogFormatParseError = strum::ParseError;
