//! Logging utilities for the Echoboard backend.
//!
//! Every binary in the workspace initializes tracing through this module so
//! log lines share one format. When a log directory is configured, output is
//! also written to a daily rolling file.

use echoboard_config::LoggingConfig;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "echoboard.log";

/// Initialize the tracing subscriber at INFO level.
///
/// # Examples
///
/// ```
/// use echoboard_common::logging;
///
/// logging::init();
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives still apply; the level is added for the `echoboard`
/// crates on top of them.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(build_filter(&level.to_string()))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize logging from the `[logging]` config section.
///
/// # Returns
///
/// The guard of the file writer when a log directory is configured. It must be
/// held for the lifetime of the process or buffered lines are lost.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = build_filter(&config.level);

    let Some(directory) = config.directory.as_deref() else {
        let result = tracing_subscriber::registry()
            .with(stdout_layer())
            .with(filter)
            .try_init();
        if result.is_ok() {
            info!("Logging initialized at level: {}", config.level);
        }
        return None;
    };

    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (files in {})",
            config.level, directory
        );
    }
    Some(guard)
}

fn stdout_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
}

fn build_filter(level: &str) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("echoboard={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(e) => {
            warn!("Ignoring invalid log level '{}': {}", level, e);
            filter.add_directive(Level::INFO.into())
        }
    }
}
