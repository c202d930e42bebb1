use std::sync::{Arc, Once, OnceLock};

use crate::engine::Engine;
use crate::health::HealthReporter;

/// Holds the single engine and delivers its exit at most once.
///
/// The engine is written once by `Start` and then read by both the
/// foreground thread and the run loop thread. `std::sync::Once` blocks
/// concurrent callers until the winning caller's `exit` returns.
pub(crate) struct EngineSlot<E> {
    engine: OnceLock<Arc<E>>,
    stopped: Once,
}

impl<E> Default for EngineSlot<E> {
    fn default() -> Self {
        Self {
            engine: OnceLock::new(),
            stopped: Once::new(),
        }
    }
}

impl<E: Engine> EngineSlot<E> {
    /// Stores the engine. Fails when one is already present.
    pub(crate) fn install(&self, engine: Arc<E>) -> Result<(), Arc<E>> {
        self.engine.set(engine)
    }

    pub(crate) fn engine(&self) -> Option<&Arc<E>> {
        self.engine.get()
    }

    /// Delivers `exit` to the engine. Returns `true` only for the caller
    /// that performed the delivery.
    ///
    /// Without an engine this is a no-op that leaves the guard unused.
    pub(crate) fn stop(&self, reporter: &dyn HealthReporter) -> bool {
        let Some(engine) = self.engine.get() else {
            return false;
        };
        let mut delivered = false;
        self.stopped.call_once(|| {
            reporter.stop_requested();
            engine.exit();
            delivered = true;
        });
        delivered
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.is_completed()
    }
}
