use std::io;
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The signal stream closed without delivering a signal.
    #[error("signal listener closed before a termination signal arrived")]
    Closed,
}

/// Shutdown listener that waits for SIGINT or SIGTERM.
///
/// Handlers are registered by [`SystemShutdownSignal::install`], so a signal
/// delivered while the host is still starting is queued rather than lost.
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
}

impl SystemShutdownSignal {
    /// Registers the signal handlers.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals =
            Signals::new([SIGINT, SIGTERM]).map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            signals: Mutex::new(signals),
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        let signal = signals.forever().next().ok_or(ShutdownError::Closed)?;
        info!(
            target: PROCESS_TARGET,
            signal,
            "shutdown signal received"
        );
        Ok(())
    }
}
