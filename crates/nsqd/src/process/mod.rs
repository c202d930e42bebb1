//! Process-level collaborators: termination signals and exit.

mod exit;
mod shutdown;

pub use exit::{ProcessExit, SystemExit};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
