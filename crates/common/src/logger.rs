use crate::error::SimSearchError;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Log file written inside the configured log directory
pub const LOG_FILE_NAME: &str = "simsearch.log";

/// Initialize logging system
///
/// Console output is always enabled. When `log_dir` is given, events are
/// also appended to `simsearch.log` in that directory.
///
/// # Arguments
/// * `log_dir` - Optional directory where the log file will be stored
/// * `log_level` - Log level (trace, debug, info, warn, error)
pub fn setup_logging(log_dir: Option<&Path>, log_level: &str) -> Result<(), SimSearchError> {
    // RUST_LOG env var takes precedence
    let level = parse_log_level(log_level).as_str().to_lowercase();
    let env_filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter());

    let file_layer = match log_dir {
        Some(dir) => {
            let log_file_path = dir.join(LOG_FILE_NAME);
            let log_file = open_log_file(dir, &log_file_path)?;
            Some(
                fmt::layer()
                    .with_writer(log_file)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_filter(env_filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SimSearchError::config(format!("Failed to initialize logging: {}", e)))?;

    match log_dir {
        Some(dir) => tracing::info!(
            "Logging initialized: level={}, log_file={}",
            log_level,
            dir.join(LOG_FILE_NAME).display()
        ),
        None => tracing::info!("Console logging initialized: level={}", log_level),
    }

    Ok(())
}

fn open_log_file(dir: &Path, path: &Path) -> Result<std::fs::File, SimSearchError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            SimSearchError::config(format!(
                "Failed to create log directory {}: {}",
                dir.display(),
                e
            ))
        })?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            SimSearchError::config(format!("Failed to open log file {}: {}", path.display(), e))
        })
}

/// Parse string to tracing Level
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", level);
            Level::INFO
        }
    }
}
