use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::Settings;

/// Installs the global subscriber.
///
/// The terminal UI owns stdout, so events go to a daily-rolling file. The
/// returned guard must be held until exit to flush buffered lines.
pub fn init_tracing(settings: &Settings) -> Result<WorkerGuard, TryInitError> {
    let telemetry = settings.telemetry();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(telemetry.log_level.clone()));

    let file_appender = tracing_appender::rolling::daily(&telemetry.log_dir, "mantra-attempt.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
