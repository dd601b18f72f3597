//!
//! src/logging.rs  Andrew Belles  Oct 17th, 2026
//!
//! Initializes logger so that swallowed fetch and probe failures
//! still leave a trace operators can follow
//!
//!

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::{LogFormat, LoggingConfig};
use crate::ApiError;

/// Keeps the non-blocking writer flushing, hold it for the program lifetime
pub struct LoggingGuard(tracing_appender::non_blocking::WorkerGuard);

pub fn init_logging(cfg: &LoggingConfig) -> Result<LoggingGuard, ApiError> {
    let (writer, guard) = non_blocking(std::io::stdout());
    let filter = std::env::var("RUST_LOG")
        .ok()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(cfg.filter_directives.clone()));

    let time = fmt::time::UtcTime::rfc_3339();
    let base = fmt::layer()
        .with_writer(writer)
        .with_timer(time)
        .with_target(cfg.include_target)
        .with_file(cfg.include_file_line)
        .with_line_number(cfg.include_file_line);

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let result = match cfg.format {
        LogFormat::Json => registry
            .with(base.json().flatten_event(true).with_current_span(true).with_span_list(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(base.with_ansi(cfg.with_ansi).pretty())
            .try_init()
    };
    result.map_err(|e| ApiError::Config(format!("logger already set: {e}")))?;

    Ok( LoggingGuard(guard) )
}
