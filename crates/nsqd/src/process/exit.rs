use tracing::error;

use super::PROCESS_TARGET;

/// Terminates the process from outside the foreground thread.
pub trait ProcessExit: Send + Sync {
    /// Ends the process with `code`.
    fn terminate(&self, code: i32);
}

/// Exits through [`std::process::exit`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExit;

impl ProcessExit for SystemExit {
    fn terminate(&self, code: i32) {
        error!(target: PROCESS_TARGET, code, "terminating process");
        std::process::exit(code);
    }
}
