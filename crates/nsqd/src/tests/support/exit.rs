use std::sync::Mutex;

use crate::process::{ProcessExit, ShutdownError, ShutdownSignal};

/// Records requested exit codes instead of ending the test process.
#[derive(Debug, Default)]
pub struct RecordingExit {
    codes: Mutex<Vec<i32>>,
}

impl RecordingExit {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().expect("exit codes lock").clone()
    }
}

impl ProcessExit for RecordingExit {
    fn terminate(&self, code: i32) {
        self.codes.lock().expect("exit codes lock").push(code);
    }
}

/// Shutdown signal that fires as soon as it is awaited.
#[derive(Debug, Default)]
pub struct ImmediateShutdown;

impl ShutdownSignal for ImmediateShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        Ok(())
    }
}
