//! Process-wide `tracing` subscriber setup for hostlink binaries.

use anyhow::Context;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_PREFIX: &str = "hostlink";

/// Install the global subscriber.
///
/// Events always go to stderr; `json` switches that layer to JSON lines. When
/// `log_dir` is given a daily-rotated JSON file is written as well, and the
/// returned guard must be held until shutdown so buffered lines get flushed.
pub fn init(log_dir: Option<&Path>, json: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(dir)
                .context("failed to create rolling file appender")?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (stderr_json, stderr_text) = if json {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json(),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(atty::is(atty::Stream::Stderr)),
            ),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_json)
        .with(stderr_text)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}
