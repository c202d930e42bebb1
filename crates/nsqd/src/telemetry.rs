//! Log output for the daemon, installed once options are resolved.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt, registry};

use nsqd_config::Options;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The directive derived from `log_level` was rejected.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another subscriber already owns the process.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the process-wide subscriber on first use.
///
/// A host started twice in one process (as in tests) keeps the first
/// configuration; later calls only hand back a [`TelemetryHandle`].
pub fn initialise(options: &Options) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let subscriber = log_subscriber(options)?;
            tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}

/// Stderr subscriber filtered at `options.log_level`.
///
/// Exactly one of the two output layers is present: JSON lines for log
/// shippers or compact text (coloured on a terminal) for operators.
fn log_subscriber(options: &Options) -> Result<impl Subscriber + Send + Sync, TelemetryError> {
    let filter = EnvFilter::try_new(options.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let json = options.structured_logs().then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_thread_names(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
    });
    let compact = (!options.structured_logs()).then(|| {
        fmt::layer()
            .compact()
            .with_thread_names(true)
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
    });

    Ok(registry().with(filter).with(json).with(compact))
}
