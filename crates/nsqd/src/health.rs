//! Structured health reporting for daemon lifecycle events.

use std::path::Path;

use nsqd_config::{Options, format_duration};

use crate::engine::EngineError;
use crate::host::{StartupError, StartupPhase};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked when `Start` begins.
    fn startup_starting(&self);

    /// Invoked after each startup phase completes.
    fn phase_completed(&self, phase: StartupPhase);

    /// Invoked once telemetry is up if `Init` switched to the service
    /// directory.
    fn working_directory_changed(&self, directory: &Path);

    /// Invoked once the run loop has been launched.
    fn startup_succeeded(&self, options: &Options);

    /// Invoked when startup fails fatally.
    fn startup_failed(&self, error: &StartupError);

    /// Invoked when a stop is requested, before the engine is told to exit.
    fn stop_requested(&self);

    /// Invoked when the engine run loop returns an error.
    fn run_loop_failed(&self, error: &EngineError);
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn startup_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "startup_starting",
            "starting daemon"
        );
    }

    fn phase_completed(&self, phase: StartupPhase) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "phase_completed",
            phase = %phase,
            "startup phase completed"
        );
    }

    fn working_directory_changed(&self, directory: &Path) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "working_directory_changed",
            directory = %directory.display(),
            "switched to service directory"
        );
    }

    fn startup_succeeded(&self, options: &Options) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "startup_succeeded",
            node_id = options.node_id,
            tcp_address = %options.tcp_address,
            http_address = %options.http_address,
            data_path = %options.data_path,
            msg_timeout = %format_duration(options.msg_timeout),
            log_level = %options.log_level,
            "daemon running"
        );
    }

    fn startup_failed(&self, error: &StartupError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "startup_failed",
            phase = %error.phase(),
            error = %error,
            "daemon startup failed"
        );
    }

    fn stop_requested(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "stop_requested",
            "stopping daemon"
        );
    }

    fn run_loop_failed(&self, error: &EngineError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "run_loop_failed",
            message = %error.message(),
            error = %error,
            "engine run loop failed"
        );
    }
}
