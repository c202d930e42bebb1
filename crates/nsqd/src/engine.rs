//! Lifecycle contract between the service host and the broker engine.
//!
//! The host never looks inside the engine. It constructs one from the
//! resolved options, asks it to load and re-persist its metadata, runs its
//! main loop on a dedicated thread, and finally asks it to exit.

use rand::rngs::StdRng;
use thiserror::Error;

use nsqd_config::Options;

/// Broker engine driven by the service host.
#[cfg_attr(test, mockall::automock)]
pub trait Engine: Send + Sync {
    /// Restores previously persisted topic and channel metadata.
    fn load_metadata(&self) -> Result<(), EngineError>;

    /// Writes the current metadata to durable storage.
    fn persist_metadata(&self) -> Result<(), EngineError>;

    /// Runs the main loop, blocking until [`Engine::exit`] is called or the
    /// loop fails.
    fn run(&self) -> Result<(), EngineError>;

    /// Starts the exit and drain sequence. Called at most once.
    fn exit(&self);
}

/// Builds engines from resolved options.
pub trait EngineFactory: Send + Sync {
    /// Engine type produced by this factory.
    type Engine: Engine + 'static;

    /// Constructs an engine. The options are final and the randomness source
    /// is the only one the engine should draw from.
    fn construct(&self, options: Options, rng: StdRng) -> Result<Self::Engine, EngineError>;
}

/// Failure reported by the engine.
#[derive(Debug, Error)]
#[error("{message}{}", render_cause(.source.as_deref()))]
pub struct EngineError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

fn render_cause(source: Option<&(dyn std::error::Error + Send + Sync + 'static)>) -> String {
    source.map(|cause| format!(": {cause}")).unwrap_or_default()
}
