//! OS-facing harness that drives a [`Service`] through its lifecycle.

use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;

use tracing::{error, info, warn};

use crate::host::{StartOutcome, StartupError};
use crate::platform::PlatformInfo;
use crate::process::ShutdownSignal;

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Three-phase lifecycle implemented by the service host.
pub trait Service {
    /// Applies platform adjustments before anything else runs.
    fn init(&self, platform: &PlatformInfo) -> Result<(), StartupError>;

    /// Brings the engine up and returns once its run loop is launched.
    fn start(&self) -> Result<StartOutcome, StartupError>;

    /// Tells the engine to exit. Safe to call any number of times.
    fn stop(&self);
}

/// Runs `service` until `shutdown` fires and maps the outcome to an exit
/// code.
///
/// Version and help requests and a signal-driven stop exit with `0`. Any
/// fatal error is written to `stderr` as `[nsqd] FATAL: <error>` and exits
/// with `1`.
pub fn run_service<S, W, O, E>(
    service: &S,
    platform: &PlatformInfo,
    shutdown: &W,
    stdout: &mut O,
    stderr: &mut E,
) -> ExitCode
where
    S: Service + ?Sized,
    W: ShutdownSignal + ?Sized,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    if let Err(error) = service.init(platform) {
        return fatal(stderr, &error);
    }

    match service.start() {
        Ok(StartOutcome::Running) => {}
        Ok(StartOutcome::Version(text) | StartOutcome::Help(text)) => {
            write_line(stdout, "stdout", text.trim_end());
            return ExitCode::SUCCESS;
        }
        Err(error) => return fatal(stderr, &error),
    }

    let waited = shutdown.wait();
    service.stop();
    match waited {
        Ok(()) => {
            info!(target: SERVICE_TARGET, "daemon stopped");
            ExitCode::SUCCESS
        }
        Err(error) => fatal(stderr, &error),
    }
}

/// Reports a fatal error and yields the failure exit code.
pub(crate) fn fatal<E>(stderr: &mut E, error: &dyn Display) -> ExitCode
where
    E: Write + ?Sized,
{
    error!(target: SERVICE_TARGET, error = %error, "fatal error");
    write_line(stderr, "stderr", &format!("[nsqd] FATAL: {error}"));
    ExitCode::FAILURE
}

/// A closed stream does not change the exit code; the loss is logged.
fn write_line<W>(out: &mut W, stream: &'static str, line: &str)
where
    W: Write + ?Sized,
{
    if let Err(error) = writeln!(out, "{line}") {
        warn!(target: SERVICE_TARGET, stream, error = %error, "failed to write output");
    }
}
