//! Fatal conditions raised by `Init` and `Start`.

use std::io;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use thiserror::Error;

use nsqd_config::{ConfigFileError, ValidationError};

use crate::engine::EngineError;
use crate::telemetry::TelemetryError;

use super::StartupPhase;

/// Errors that abort daemon startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Switching to the service directory failed.
    #[error("failed to change working directory to '{}': {source}", path.display())]
    WorkingDirectory {
        /// Target directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The command line could not be parsed.
    #[error("invalid command line: {0}")]
    Flags(#[source] clap::Error),
    /// The configuration file could not be read or decoded.
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),
    /// The configuration file broke a validation rule.
    #[error("invalid config file '{path}': {source}")]
    Validation {
        /// File that failed validation.
        path: Utf8PathBuf,
        /// Violated rule.
        #[source]
        source: ValidationError,
    },
    /// The merged option set broke a validation rule.
    #[error("invalid configuration: {0}")]
    Resolution(#[source] ValidationError),
    /// The tracing subscriber could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The engine could not be built.
    #[error("engine construction failed: {0}")]
    Construct(#[source] EngineError),
    /// Persisted metadata could not be restored.
    #[error("metadata load failed: {0}")]
    LoadMetadata(#[source] EngineError),
    /// Metadata could not be written back after load.
    #[error("metadata persist failed: {0}")]
    PersistMetadata(#[source] EngineError),
    /// The run loop thread could not be spawned.
    #[error("failed to spawn engine run loop: {0}")]
    Spawn(#[source] io::Error),
    /// `Start` was invoked on a host that already owns an engine.
    #[error("service host already started")]
    AlreadyStarted,
}

impl StartupError {
    /// Phase in which the failure occurred.
    #[must_use]
    pub fn phase(&self) -> StartupPhase {
        match self {
            Self::WorkingDirectory { .. } => StartupPhase::WorkingDirectory,
            Self::Flags(_) => StartupPhase::Flags,
            Self::ConfigFile(_) => StartupPhase::ConfigFile,
            Self::Validation { .. } => StartupPhase::Validation,
            Self::Resolution(_) => StartupPhase::Resolution,
            Self::Telemetry(_) => StartupPhase::Telemetry,
            Self::Construct(_) => StartupPhase::Construction,
            Self::LoadMetadata(_) => StartupPhase::LoadMetadata,
            Self::PersistMetadata(_) => StartupPhase::PersistMetadata,
            Self::Spawn(_) | Self::AlreadyStarted => StartupPhase::RunLoop,
        }
    }
}
