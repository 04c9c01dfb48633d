//! Tracing subscriber setup for hosts embedding the navigation core.

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "kestrel=info";
const LOG_PREFIX: &str = "kestrel";

/// Install a stdout + timestamped file logger. Returns the log file path.
///
/// Keeps only the newest `keep_count` log files in `log_dir`. The filter is
/// taken from `RUST_LOG` when set. Calling this twice is harmless; the second
/// subscriber is simply not installed.
pub fn setup_file_logging(log_dir: &Path, keep_count: usize) -> std::io::Result<PathBuf> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    cleanup_old_logs(log_dir, keep_count);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_file_path = log_dir.join(&log_filename);

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init();

    Ok(log_file_path)
}

/// Install a test-friendly subscriber that writes through the test harness.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kestrel=debug"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// Delete all but the newest `keep_count` log files written by this crate.
pub fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first; ties broken by name so the result does not depend on readdir order
        log_files.sort_by_key(|e| (e.metadata().ok().and_then(|m| m.modified().ok()), e.file_name()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_newest_and_ignores_foreign_files() {
        let dir = std::env::temp_dir().join(format!("kestrel_log_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5 {
            fs::write(dir.join(format!("kestrel_2024010{}_000000.log", i)), b"x").unwrap();
        }
        fs::write(dir.join("other.log"), b"x").unwrap();

        cleanup_old_logs(&dir, 2);

        let remaining: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(remaining.iter().filter(|n| n.starts_with("kestrel")).count(), 2);
        assert!(remaining.iter().any(|n| n == "other.log"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_init_test_logging_can_be_called_repeatedly() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("[CONFIG] test subscriber installed");
    }
}
