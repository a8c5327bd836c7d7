//! Logging Infrastructure
//!
//! Console logging with an `EnvFilter` (`RUST_LOG` wins over the configured
//! level), plus a daily rolling file when a log directory exists.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with console output only
pub fn init_logger(log_level: &str) {
    init_logger_with_file(log_level, None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},sqlx=warn,tower_http=info")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "mesa-server");
            // try_init: a second initialisation (tests) is ignored
            let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
            return;
        }
        eprintln!("Log directory {dir} does not exist, logging to console only");
    }

    let _ = subscriber.try_init();
}
