//! Engine double that can be told to fail at any lifecycle step.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Condvar, Mutex};

use rand::rngs::StdRng;

use nsqd_config::Options;

use crate::engine::{Engine, EngineError, EngineFactory};

/// Lifecycle step at which the fake engine fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailAt {
    #[default]
    Nowhere,
    Construct,
    Load,
    Persist,
    Run,
}

/// Call counters shared between a factory, its engines and the test.
#[derive(Debug, Default)]
pub struct EngineCalls {
    constructed: AtomicUsize,
    loaded: AtomicUsize,
    persisted: AtomicUsize,
    ran: AtomicUsize,
    exited: AtomicUsize,
    order: Mutex<Vec<&'static str>>,
    options: Mutex<Option<Options>>,
}

impl EngineCalls {
    fn record(&self, counter: &AtomicUsize, step: &'static str) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.order.lock().expect("order lock").push(step);
    }

    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn loaded(&self) -> usize {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> usize {
        self.persisted.load(Ordering::SeqCst)
    }

    pub fn ran(&self) -> usize {
        self.ran.load(Ordering::SeqCst)
    }

    pub fn exited(&self) -> usize {
        self.exited.load(Ordering::SeqCst)
    }

    /// Steps in the order the host invoked them.
    pub fn order(&self) -> Vec<&'static str> {
        self.order.lock().expect("order lock").clone()
    }

    /// Options handed to the most recent construction.
    pub fn options(&self) -> Option<Options> {
        self.options.lock().expect("options lock").clone()
    }
}

/// Engine double whose run loop blocks until `exit`.
#[derive(Debug)]
pub struct FakeEngine {
    fail_at: FailAt,
    run_gate: Option<Arc<Barrier>>,
    calls: Arc<EngineCalls>,
    exiting: Mutex<bool>,
    wake: Condvar,
}

impl Engine for FakeEngine {
    fn load_metadata(&self) -> Result<(), EngineError> {
        self.calls.record(&self.calls.loaded, "load");
        match self.fail_at {
            FailAt::Load => Err(EngineError::new("metadata unreadable")),
            _ => Ok(()),
        }
    }

    fn persist_metadata(&self) -> Result<(), EngineError> {
        self.calls.record(&self.calls.persisted, "persist");
        match self.fail_at {
            FailAt::Persist => Err(EngineError::new("disk full")),
            _ => Ok(()),
        }
    }

    fn run(&self) -> Result<(), EngineError> {
        self.calls.record(&self.calls.ran, "run");
        if let Some(gate) = &self.run_gate {
            gate.wait();
        }
        if self.fail_at == FailAt::Run {
            return Err(EngineError::new("listener closed"));
        }
        let mut exiting = self.exiting.lock().expect("exit lock");
        while !*exiting {
            exiting = self.wake.wait(exiting).expect("exit lock");
        }
        Ok(())
    }

    fn exit(&self) {
        self.calls.record(&self.calls.exited, "exit");
        *self.exiting.lock().expect("exit lock") = true;
        self.wake.notify_all();
    }
}

/// Factory producing [`FakeEngine`] instances.
#[derive(Debug, Clone, Default)]
pub struct FakeEngineFactory {
    pub fail_at: FailAt,
    /// Barrier every run loop waits on before doing anything else.
    pub run_gate: Option<Arc<Barrier>>,
    pub calls: Arc<EngineCalls>,
}

impl FakeEngineFactory {
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            ..Self::default()
        }
    }

    /// Run loops hold at `gate` so a test can line up a competing call.
    #[must_use]
    pub fn with_run_gate(mut self, gate: Arc<Barrier>) -> Self {
        self.run_gate = Some(gate);
        self
    }
}

impl EngineFactory for FakeEngineFactory {
    type Engine = FakeEngine;

    fn construct(&self, options: Options, _rng: StdRng) -> Result<Self::Engine, EngineError> {
        self.calls.record(&self.calls.constructed, "construct");
        *self.calls.options.lock().expect("options lock") = Some(options);
        if self.fail_at == FailAt::Construct {
            return Err(EngineError::new("data path missing"));
        }
        Ok(FakeEngine {
            fail_at: self.fail_at,
            run_gate: self.run_gate.clone(),
            calls: Arc::clone(&self.calls),
            exiting: Mutex::new(false),
            wake: Condvar::new(),
        })
    }
}
