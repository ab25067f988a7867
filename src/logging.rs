//! `tracing` backed [`Logger`] and subscriber setup

use crate::core::traits::{LogContext, LogLevel, Logger};
use tracing_subscriber::{EnvFilter, fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "video_publisher=info";

/// Install a compact console subscriber filtered by `RUST_LOG`
///
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "video_publisher=debug"
    } else {
        DEFAULT_LOG_FILTER
    };

    let console_fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(Format::default().compact().with_target(false));

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(console_fmt)
        .try_init();
}

/// Forwards orchestrator log entries to `tracing`
///
/// `emergency`, `alert`, `critical` and `error` all become `ERROR` events;
/// the original severity is kept in the `severity` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) {
        let context = serde_json::to_string(context).unwrap_or_default();

        match level {
            LogLevel::Emergency | LogLevel::Alert | LogLevel::Critical | LogLevel::Error => {
                tracing::error!(severity = %level, context = %context, "{}", message)
            }
            LogLevel::Warning => tracing::warn!(severity = %level, context = %context, "{}", message),
            LogLevel::Notice | LogLevel::Info => {
                tracing::info!(severity = %level, context = %context, "{}", message)
            }
            LogLevel::Debug => tracing::debug!(severity = %level, context = %context, "{}", message),
        }
    }
}
