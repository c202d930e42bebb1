use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] or [`LogLevel`] from text.
pub type LogParseError = strum::ParseError;

/// Minimum severity emitted by the daemon.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Normal operational messages.
    #[default]
    Info,
    /// Recoverable anomalies.
    Warn,
    /// Failures.
    Error,
    /// Only conditions that terminate the process.
    Fatal,
}

impl LogLevel {
    /// Filter directive understood by `tracing-subscriber`.
    ///
    /// `tracing` has no fatal level, so [`LogLevel::Fatal`] maps to `error`.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error | Self::Fatal => "error",
        }
    }
}
