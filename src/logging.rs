//! Logging initialization
//!
//! Supports configuration-based logging with file rotation, JSON formatting,
//! and environment variable overrides.

use std::fs;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Guard that keeps the non-blocking file writer alive.
/// Must be kept alive for the duration of the program.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize logging from configuration.
///
/// Supports JSON or human-readable output, an optional daily-rotated log
/// file, and `RUST_LOG` overrides for the filter.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let env_filter = build_env_filter(config);
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let file_guard = if config.json {
        let console_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stdout);

        if let Some(directory) = &config.file_directory {
            let (file_appender, file_guard) = create_file_appender(directory, &config.file_prefix)?;
            let file_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender);
            subscriber.with(console_layer).with(file_layer).init();
            Some(file_guard)
        } else {
            subscriber.with(console_layer).init();
            None
        }
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stdout);

        if let Some(directory) = &config.file_directory {
            let (file_appender, file_guard) = create_file_appender(directory, &config.file_prefix)?;
            let file_layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_appender);
            subscriber.with(console_layer).with(file_layer).init();
            Some(file_guard)
        } else {
            subscriber.with(console_layer).init();
            None
        }
    };

    tracing::info!(level = %config.level, json = config.json, "Logging initialized");

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Keep http client internals quiet by default.
        EnvFilter::new(format!(
            "logward={},hyper=warn,reqwest=warn,redis=warn",
            config.level
        ))
    })
}

fn create_file_appender(
    directory: &str,
    prefix: &str,
) -> anyhow::Result<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    fs::create_dir_all(directory)?;
    let file_appender = tracing_appender::rolling::daily(directory, prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    Ok((non_blocking, guard))
}

/// Initialize logging from `RUST_LOG` alone.
///
/// Lightweight alternative for tests and tools that don't carry config.
pub fn init_simple_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logward=info,hyper=warn,reqwest=warn,redis=warn".into()),
        )
        .with(fmt::layer())
        .init();
}
