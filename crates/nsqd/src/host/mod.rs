//! The service host: `Init`, `Start` and `Stop` over an opaque engine.
//!
//! `Start` runs a strictly ordered sequence. Every step must succeed before
//! the next begins and any failure is fatal:
//!
//! 1. compiled-in defaults
//! 2. command-line flags (`--version` and `--help` short-circuit here)
//! 3. configuration file decode
//! 4. file validation
//! 5. resolution of the final [`Options`]
//! 6. engine construction
//! 7. metadata load
//! 8. metadata persist
//! 9. run loop launch on the `nsqd-main` thread
//!
//! Telemetry is installed between steps 5 and 6 because the log level is
//! only known once options are resolved.

mod errors;
mod phase;
mod slot;

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use clap::error::ErrorKind;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use nsqd_config::{Cli, Options, RawConfig, resolve};

use crate::engine::{Engine, EngineFactory};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::platform::PlatformInfo;
use crate::process::{ProcessExit, SystemExit};
use crate::service::Service;
use crate::telemetry;
use crate::version::version_string;

pub use errors::StartupError;
pub use phase::StartupPhase;

use slot::EngineSlot;

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");
const RUN_LOOP_THREAD: &str = "nsqd-main";

/// Result of a successful `Start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The engine run loop is executing on its own thread.
    Running,
    /// `--version` was requested; the payload is the version line.
    Version(String),
    /// `--help` was requested; the payload is the rendered help.
    Help(String),
}

/// Drives a single engine through its lifecycle.
pub struct ServiceHost<F: EngineFactory> {
    args: Vec<OsString>,
    factory: F,
    reporter: Arc<dyn HealthReporter>,
    exit: Arc<dyn ProcessExit>,
    seed: Option<u64>,
    slot: Arc<EngineSlot<F::Engine>>,
    runner: Mutex<Option<JoinHandle<()>>>,
    /// Set by `Init`, reported once telemetry can carry it.
    switched_to: Mutex<Option<PathBuf>>,
}

impl<F: EngineFactory> ServiceHost<F> {
    /// Builds a host that parses `args` (including the program name) and
    /// constructs its engine with `factory`.
    pub fn new<I, T>(args: I, factory: F) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            factory,
            reporter: Arc::new(StructuredHealthReporter::new()),
            exit: Arc::new(SystemExit),
            seed: None,
            slot: Arc::new(EngineSlot::default()),
            runner: Mutex::new(None),
            switched_to: Mutex::new(None),
        }
    }

    /// Replaces the health reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replaces the hook used to end the process after a run loop failure.
    #[must_use]
    pub fn with_exit(mut self, exit: Arc<dyn ProcessExit>) -> Self {
        self.exit = exit;
        self
    }

    /// Seeds the engine's randomness source with `seed` instead of the
    /// wall clock.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Engine owned by the host once `Start` has succeeded.
    #[must_use]
    pub fn engine(&self) -> Option<Arc<F::Engine>> {
        self.slot.engine().cloned()
    }

    /// Whether the engine has been told to exit.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.slot.is_stopped()
    }

    /// Waits for the run loop thread to finish, if one was launched and has
    /// not been joined yet.
    pub fn join(&self) {
        let handle = self
            .runner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(target: HOST_TARGET, "engine run loop panicked");
            }
        }
    }

    fn run_startup(&self) -> Result<StartOutcome, StartupError> {
        let defaults = Options::default();
        self.reporter.phase_completed(StartupPhase::Defaults);

        let cli = match Cli::try_parse_from(&self.args) {
            Ok(cli) => cli,
            Err(error) if error.kind() == ErrorKind::DisplayHelp => {
                return Ok(StartOutcome::Help(error.render().to_string()));
            }
            Err(error) => return Err(StartupError::Flags(error)),
        };
        if cli.version {
            return Ok(StartOutcome::Version(version_string()));
        }
        self.reporter.phase_completed(StartupPhase::Flags);

        let validated = match cli.config_path() {
            Some(path) => {
                let raw = RawConfig::from_file(path)?;
                self.reporter.phase_completed(StartupPhase::ConfigFile);
                let validated = raw.validate().map_err(|source| StartupError::Validation {
                    path: path.to_owned(),
                    source,
                })?;
                self.reporter.phase_completed(StartupPhase::Validation);
                Some(validated)
            }
            None => None,
        };

        let options = resolve(defaults, validated.as_ref(), &cli.overrides)
            .map_err(StartupError::Resolution)?;
        self.reporter.phase_completed(StartupPhase::Resolution);

        telemetry::initialise(&options)?;
        self.reporter.phase_completed(StartupPhase::Telemetry);
        let switched_to = self
            .switched_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(directory) = switched_to {
            self.reporter.working_directory_changed(&directory);
        }

        let seed = self.seed.unwrap_or_else(clock_seed);
        debug!(target: HOST_TARGET, seed, "seeded randomness source");
        let engine = self
            .factory
            .construct(options.clone(), StdRng::seed_from_u64(seed))
            .map_err(StartupError::Construct)?;
        self.reporter.phase_completed(StartupPhase::Construction);

        engine.load_metadata().map_err(StartupError::LoadMetadata)?;
        self.reporter.phase_completed(StartupPhase::LoadMetadata);

        engine
            .persist_metadata()
            .map_err(StartupError::PersistMetadata)?;
        self.reporter.phase_completed(StartupPhase::PersistMetadata);

        let engine = Arc::new(engine);
        self.slot
            .install(Arc::clone(&engine))
            .map_err(|_| StartupError::AlreadyStarted)?;
        self.launch(engine)?;
        self.reporter.phase_completed(StartupPhase::RunLoop);
        self.reporter.startup_succeeded(&options);
        Ok(StartOutcome::Running)
    }

    fn launch(&self, engine: Arc<F::Engine>) -> Result<(), StartupError> {
        let slot = Arc::clone(&self.slot);
        let reporter = Arc::clone(&self.reporter);
        let exit = Arc::clone(&self.exit);
        let handle = thread::Builder::new()
            .name(RUN_LOOP_THREAD.to_owned())
            .spawn(move || {
                if let Err(error) = engine.run() {
                    reporter.run_loop_failed(&error);
                    slot.stop(reporter.as_ref());
                    exit.terminate(1);
                }
            })
            .map_err(StartupError::Spawn)?;
        *self.runner.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }
}

impl<F: EngineFactory> Service for ServiceHost<F> {
    fn init(&self, platform: &PlatformInfo) -> Result<(), StartupError> {
        if !platform.is_supervised() {
            return Ok(());
        }
        let Some(directory) = platform.service_directory() else {
            return Err(StartupError::WorkingDirectory {
                path: platform.executable().map(ToOwned::to_owned).unwrap_or_default(),
                source: io::Error::new(io::ErrorKind::NotFound, "executable directory unknown"),
            });
        };
        env::set_current_dir(directory).map_err(|source| StartupError::WorkingDirectory {
            path: directory.to_owned(),
            source,
        })?;
        *self
            .switched_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(directory.to_owned());
        Ok(())
    }

    fn start(&self) -> Result<StartOutcome, StartupError> {
        self.reporter.startup_starting();
        let outcome = self.run_startup();
        if let Err(error) = &outcome {
            self.reporter.startup_failed(error);
        }
        outcome
    }

    fn stop(&self) {
        if self.slot.stop(self.reporter.as_ref()) {
            self.join();
        }
    }
}

/// Seed drawn from the wall clock.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        // Truncation keeps the fast-moving low bits.
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
