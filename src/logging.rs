//! Subscriber setup for the server's `tracing` output.
//!
//! Events go to the terminal and to a log file. The file is `LEARNAPP_LOG_FILE` when set,
//! `logs/learnapp.log` otherwise, and is written from a background worker thread.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::get_config;

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "learnapp.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Call once, after [`crate::config::init_config`].
///
/// `RUST_LOG` selects the filter (`info` when unset or invalid). If the log file cannot be
/// opened the server keeps running with terminal output only.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let terminal = fmt::layer().with_target(false).compact();
    let file = open_log_writer(get_config().log_file.as_deref()).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(terminal)
        .with(file)
        .init();
}

fn open_log_writer(path: Option<&str>) -> Option<NonBlocking> {
    let Some(path) = path else {
        if let Err(err) = std::fs::create_dir_all(DEFAULT_LOG_DIR) {
            eprintln!("Cannot create {DEFAULT_LOG_DIR}/ for logs: {err}");
            return None;
        }
        let appender = tracing_appender::rolling::never(DEFAULT_LOG_DIR, DEFAULT_LOG_FILE);
        return Some(spawn_writer(appender));
    };

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(spawn_writer)
        .map_err(|err| eprintln!("Cannot open log file {path}: {err}"))
        .ok()
}

/// Move `writer` onto a worker thread; the guard flushes it at process exit.
fn spawn_writer<W>(writer: W) -> NonBlocking
where
    W: std::io::Write + Send + 'static,
{
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    let _ = LOG_GUARD.set(guard);
    non_blocking
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopenable_log_path_falls_back_to_terminal_only() {
        assert!(open_log_writer(Some("/nonexistent-learnapp-dir/learnapp.log")).is_none());
    }

    #[test]
    fn explicit_log_path_is_created() {
        let path = std::env::temp_dir().join(format!("learnapp-{}.log", std::process::id()));
        let path_str = path.to_str().expect("utf-8 temp path");
        assert!(open_log_writer(Some(path_str)).is_some());
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
