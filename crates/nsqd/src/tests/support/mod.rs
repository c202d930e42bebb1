//! Test doubles and the scenario world for the lifecycle suites.

mod engine;
mod exit;
mod reporter;
mod world;

pub use engine::{EngineCalls, FailAt, FakeEngine, FakeEngineFactory};
pub use exit::{ImmediateShutdown, RecordingExit};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{LifecycleWorld, world};
