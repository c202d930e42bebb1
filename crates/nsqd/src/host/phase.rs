use std::fmt;

/// Ordered steps of `Start`, plus the `Init` adjustment and run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    /// Switching to the service directory during `Init`.
    WorkingDirectory,
    /// Establishing compiled-in defaults.
    Defaults,
    /// Parsing command-line flags.
    Flags,
    /// Decoding the configuration file.
    ConfigFile,
    /// Validating the decoded file.
    Validation,
    /// Merging defaults, file and flags.
    Resolution,
    /// Installing the tracing subscriber.
    Telemetry,
    /// Building the engine.
    Construction,
    /// Restoring persisted metadata.
    LoadMetadata,
    /// Writing metadata back after load.
    PersistMetadata,
    /// Launching the engine run loop.
    RunLoop,
}

impl StartupPhase {
    /// Stable identifier used in telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WorkingDirectory => "working_directory",
            Self::Defaults => "defaults",
            Self::Flags => "flags",
            Self::ConfigFile => "config_file",
            Self::Validation => "validation",
            Self::Resolution => "resolution",
            Self::Telemetry => "telemetry",
            Self::Construction => "construction",
            Self::LoadMetadata => "load_metadata",
            Self::PersistMetadata => "persist_metadata",
            Self::RunLoop => "run_loop",
        }
    }
}

impl fmt::Display for StartupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
