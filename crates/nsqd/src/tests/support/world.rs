//! BDD test world: owns the host under test together with its doubles.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use crate::host::{ServiceHost, StartOutcome, StartupError};
use crate::service::Service;

use super::engine::{EngineCalls, FailAt, FakeEngineFactory};
use super::exit::RecordingExit;
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct LifecycleWorld {
    temp_dir: TempDir,
    args: Vec<OsString>,
    factory: FakeEngineFactory,
    pub reporter: Arc<RecordingHealthReporter>,
    pub exit: Arc<RecordingExit>,
    host: Option<ServiceHost<FakeEngineFactory>>,
    outcome: Option<Result<StartOutcome, StartupError>>,
}

impl LifecycleWorld {
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("temporary directory"),
            args: vec![OsString::from("nsqd")],
            factory: FakeEngineFactory::default(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            exit: Arc::new(RecordingExit::default()),
            host: None,
            outcome: None,
        }
    }

    pub fn fail_at(&mut self, fail_at: FailAt) {
        self.factory = FakeEngineFactory::failing_at(fail_at);
    }

    pub fn push_arg(&mut self, arg: impl Into<OsString>) {
        self.args.push(arg.into());
    }

    /// Writes `contents` to a config file and selects it with `--config`.
    pub fn use_config(&mut self, contents: &str) {
        let path = self.temp_dir.path().join("nsqd.toml");
        fs::write(&path, contents).expect("write configuration");
        self.push_arg("--config");
        self.push_arg(path);
    }

    pub fn calls(&self) -> &EngineCalls {
        &self.factory.calls
    }

    fn host(&mut self) -> &ServiceHost<FakeEngineFactory> {
        let Self {
            args,
            factory,
            reporter,
            exit,
            host,
            ..
        } = self;
        host.get_or_insert_with(|| {
            ServiceHost::new(args.clone(), factory.clone())
                .with_reporter(Arc::clone(reporter) as _)
                .with_exit(Arc::clone(exit) as _)
                .with_seed(42)
        })
    }

    pub fn start(&mut self) {
        let outcome = self.host().start();
        self.outcome = Some(outcome);
    }

    pub fn stop(&mut self) {
        self.host().stop();
    }

    /// Waits for the run loop thread to finish.
    pub fn join(&mut self) {
        self.host().join();
    }

    pub fn outcome(&self) -> Option<&Result<StartOutcome, StartupError>> {
        self.outcome.as_ref()
    }
}

impl Drop for LifecycleWorld {
    fn drop(&mut self) {
        if let Some(host) = self.host.as_ref() {
            host.stop();
        }
    }
}

/// Builds a fresh world for each scenario.
pub fn world() -> RefCell<LifecycleWorld> {
    RefCell::new(LifecycleWorld::new())
}
