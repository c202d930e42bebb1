//! Process lifecycle for the `nsqd` message broker daemon.
//!
//! The daemon turns its start conditions (arguments, an optional TOML
//! configuration file, termination signals and the launch context) into a
//! running engine that can be stopped cleanly. [`ServiceHost`] implements the
//! `Init`/`Start`/`Stop` contract over any [`EngineFactory`], and
//! [`run_service`] is the harness that sequences those phases against the
//! operating system.
//!
//! Startup is fail-fast: a bad flag, an unreadable or invalid configuration
//! file, or an engine that cannot be built, loaded or persisted terminates
//! the process with a non-zero exit code before the run loop begins. Once
//! running, the engine is told to exit exactly once no matter how many
//! callers request a stop.

mod engine;
mod health;
mod host;
mod metadata;
mod platform;
mod process;
mod service;
mod standalone;
mod telemetry;
mod version;

use std::env;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

pub use engine::{Engine, EngineError, EngineFactory};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use host::{ServiceHost, StartOutcome, StartupError, StartupPhase};
pub use metadata::{
    ChannelMetadata, METADATA_FILE_NAME, Metadata, MetadataError, TopicMetadata, metadata_path,
};
pub use platform::{PlatformInfo, SUPERVISED_ENV_VAR};
pub use process::{ProcessExit, ShutdownError, ShutdownSignal, SystemExit, SystemShutdownSignal};
pub use service::{Service, run_service};
pub use standalone::{StandaloneEngine, StandaloneEngineFactory};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use version::version_string;

/// Runs the daemon with the production collaborators.
///
/// Signal handlers are installed before `Init` so a termination request
/// that arrives during startup is not lost.
#[must_use]
pub fn run_daemon() -> ExitCode {
    let shutdown = match SystemShutdownSignal::install() {
        Ok(shutdown) => shutdown,
        Err(error) => return service::fatal(&mut io::stderr(), &error),
    };
    let host = ServiceHost::new(env::args_os(), StandaloneEngineFactory)
        .with_reporter(Arc::new(StructuredHealthReporter::new()))
        .with_exit(Arc::new(SystemExit));
    run_service(
        &host,
        &PlatformInfo::detect(),
        &shutdown,
        &mut io::stdout(),
        &mut io::stderr(),
    )
}

#[cfg(test)]
mod tests;
