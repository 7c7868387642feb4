//! Console and rolling file log output.

use anyhow::Context;
use blobdrop_shared::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// until the process exits.
pub fn init(config: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let appender = file_appender(config)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter)))
        .with(fmt::layer().with_target(true))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .context("tracing subscriber already installed")?;

    Ok(guard)
}

/// Daily rotating `blobdrop.<date>.log` files under `config.directory`.
fn file_appender(config: &LoggingConfig) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!("cannot create log directory {}", config.directory.display())
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("blobdrop")
        .filename_suffix("log")
        .max_log_files(config.retained_files)
        .build(&config.directory)
        .context("cannot open log file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_appender_creates_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let config = LoggingConfig {
            directory: root.path().join("App_Data").join("logs"),
            ..LoggingConfig::default()
        };

        let mut appender = file_appender(&config).expect("appender");
        appender.write_all(b"hello\n").expect("write");
        appender.flush().expect("flush");

        let files: Vec<_> = std::fs::read_dir(&config.directory)
            .expect("log dir exists")
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("blobdrop"));
        assert!(files[0].ends_with(".log"));
    }
}
