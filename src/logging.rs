//! Tracing setup for processes that embed the substitution engine
//!
//! The library itself only emits events; hosts call [`init_tracing`] once.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Daily-rolled file name under `LOG_DIR`
pub const LOG_FILE_PREFIX: &str = "xenolexia.log";

/// Keeps the non-blocking file writer alive; drop it to flush
///
/// Hold it for the lifetime of the reader session, e.g. next to the
/// `TranslationEngine`, or pending events are lost on exit.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Whether `ENABLE_FILE_LOGS` asks for the dictionary and review events to be
/// written to disk as well as stdout
pub fn file_logging_enabled() -> bool {
    std::env::var("ENABLE_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Installs the global subscriber for a host process
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    if file_logging_enabled() {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
        if let Err(err) = std::fs::create_dir_all(&log_dir) {
            eprintln!("failed to create log directory {log_dir}: {err}");
        } else {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true);

            let installed = tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init()
                .is_ok();

            return installed.then_some(FileLogGuard { _guard: guard });
        }
    }

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init();

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let _first = init_tracing("debug");
        let second = init_tracing("not a valid filter [");
        assert!(second.is_none());
        tracing::debug!("still logging");
    }
}
