//! Lifecycle-complete engine shipped with the daemon binary.
//!
//! It owns the metadata document and the run loop but carries no queueing
//! or networking of its own.

use std::env;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use camino::Utf8PathBuf;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use nsqd_config::Options;

use crate::engine::{Engine, EngineError, EngineFactory};
use crate::metadata::Metadata;

const ENGINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::engine");

#[derive(Debug, Default)]
struct RunState {
    metadata: Metadata,
    exiting: bool,
}

/// Engine that persists metadata and idles until told to exit.
#[derive(Debug)]
pub struct StandaloneEngine {
    options: Options,
    data_dir: Utf8PathBuf,
    rng: Mutex<StdRng>,
    state: Mutex<RunState>,
    wake: Condvar,
}

impl StandaloneEngine {
    /// Builds an engine rooted at the configured data directory.
    pub fn new(options: Options, rng: StdRng) -> Result<Self, EngineError> {
        let data_dir = resolve_data_dir(&options)?;
        if !data_dir.is_dir() {
            return Err(EngineError::new(format!(
                "data path '{data_dir}' does not exist or is not a directory"
            )));
        }
        Ok(Self {
            options,
            data_dir,
            rng: Mutex::new(rng),
            state: Mutex::new(RunState::default()),
            wake: Condvar::new(),
        })
    }

    /// Directory holding the metadata document.
    #[must_use]
    pub fn data_dir(&self) -> &Utf8PathBuf {
        &self.data_dir
    }

    /// Options the engine was built from.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Snapshot of the in-memory metadata.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        self.lock_state().metadata.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn resolve_data_dir(options: &Options) -> Result<Utf8PathBuf, EngineError> {
    if !options.data_path.as_str().is_empty() {
        return Ok(options.data_path.clone());
    }
    let cwd = env::current_dir()
        .map_err(|error| EngineError::with_source("failed to read working directory", error))?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
        EngineError::new(format!(
            "working directory '{}' is not valid UTF-8",
            path.display()
        ))
    })
}

impl Engine for StandaloneEngine {
    fn load_metadata(&self) -> Result<(), EngineError> {
        let metadata = Metadata::read(&self.data_dir)
            .map_err(|error| EngineError::with_source("cannot restore topics", error))?;
        debug!(
            target: ENGINE_TARGET,
            topics = metadata.topics.len(),
            "metadata loaded"
        );
        self.lock_state().metadata = metadata;
        Ok(())
    }

    fn persist_metadata(&self) -> Result<(), EngineError> {
        let mut metadata = self.metadata();
        metadata.version = env!("CARGO_PKG_VERSION").to_owned();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let path = metadata
            .write(&self.data_dir, &mut *rng)
            .map_err(|error| EngineError::with_source("cannot save topics", error))?;
        debug!(target: ENGINE_TARGET, path = %path, "metadata persisted");
        Ok(())
    }

    fn run(&self) -> Result<(), EngineError> {
        info!(
            target: ENGINE_TARGET,
            tcp_address = %self.options.tcp_address,
            "engine running"
        );
        let mut state = self.lock_state();
        while !state.exiting {
            state = self
                .wake
                .wait(state)
                .map_err(|_| EngineError::new("engine state lock poisoned"))?;
        }
        info!(target: ENGINE_TARGET, "engine run loop finished");
        Ok(())
    }

    fn exit(&self) {
        {
            let mut state = self.lock_state();
            state.exiting = true;
        }
        self.wake.notify_all();
        if let Err(error) = self.persist_metadata() {
            warn!(target: ENGINE_TARGET, error = %error, "final metadata persist failed");
        }
    }
}

/// Factory producing [`StandaloneEngine`] instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandaloneEngineFactory;

impl EngineFactory for StandaloneEngineFactory {
    type Engine = StandaloneEngine;

    fn construct(&self, options: Options, rng: StdRng) -> Result<Self::Engine, EngineError> {
        StandaloneEngine::new(options, rng)
    }
}
