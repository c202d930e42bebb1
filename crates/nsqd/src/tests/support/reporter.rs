//! Test double for [`HealthReporter`] that records lifecycle events.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nsqd_config::Options;

use crate::engine::EngineError;
use crate::health::HealthReporter;
use crate::host::{StartupError, StartupPhase};

/// Lifecycle events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    StartupStarting,
    PhaseCompleted(StartupPhase),
    WorkingDirectoryChanged(PathBuf),
    StartupSucceeded,
    StartupFailed(StartupPhase),
    StopRequested,
    RunLoopFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn startup_starting(&self) {
        self.record(HealthEvent::StartupStarting);
    }

    fn phase_completed(&self, phase: StartupPhase) {
        self.record(HealthEvent::PhaseCompleted(phase));
    }

    fn working_directory_changed(&self, directory: &Path) {
        self.record(HealthEvent::WorkingDirectoryChanged(directory.to_path_buf()));
    }

    fn startup_succeeded(&self, _options: &Options) {
        self.record(HealthEvent::StartupSucceeded);
    }

    fn startup_failed(&self, error: &StartupError) {
        self.record(HealthEvent::StartupFailed(error.phase()));
    }

    fn stop_requested(&self) {
        self.record(HealthEvent::StopRequested);
    }

    fn run_loop_failed(&self, error: &EngineError) {
        self.record(HealthEvent::RunLoopFailed(error.message().to_owned()));
    }
}
