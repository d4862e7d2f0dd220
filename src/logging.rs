/// Tracing setup: terminal output always, rolling log files on request.
///
/// `RUST_LOG` controls filtering (default: "info"), e.g.
/// `RUST_LOG=bid_scraper=debug,reqwest=warn`.
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the background file writers alive. Dropping it flushes them.
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// With a `log_dir`, two daily-rotated files are written there as well:
/// `bid_scraper.log` (plain text) and `bid_scraper.json.log` (one JSON
/// object per event). If the directory cannot be created the file layers
/// are skipped with a warning and logging continues on stdout.
pub fn init_logging(log_dir: Option<&Path>) -> Result<LoggingGuard, LoggingError> {
    let mut guards = Vec::new();

    let stdout_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(env_filter());

    let mut dir_error = None;
    let file_dir = log_dir.filter(|dir| match std::fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            dir_error = Some(e);
            false
        }
    });

    let (text_layer, json_layer) = match file_dir {
        Some(dir) => {
            let (text_writer, text_guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "bid_scraper.log"));
            let (json_writer, json_guard) = tracing_appender::non_blocking(
                tracing_appender::rolling::daily(dir, "bid_scraper.json.log"),
            );
            guards.push(text_guard);
            guards.push(json_guard);

            let text_layer = fmt::layer()
                .with_writer(text_writer)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false)
                .compact()
                .with_filter(env_filter());

            let json_layer = fmt::layer()
                .json()
                .with_writer(json_writer)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter());

            (Some(text_layer), Some(json_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(text_layer)
        .with(json_layer)
        .try_init()?;

    match (log_dir, dir_error) {
        (Some(dir), Some(e)) => tracing::warn!(
            dir = %dir.display(),
            error = %e,
            "Cannot create log directory, logging to stdout only"
        ),
        (Some(dir), None) => tracing::debug!("Log files written to {}", dir.display()),
        _ => {}
    }

    Ok(LoggingGuard { _guards: guards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logging_initialization_creates_dir() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs");

        // A second init in the same process fails, but the directory is
        // created before the subscriber is installed either way.
        let _ = init_logging(Some(&log_path));
        assert!(log_path.exists());
    }

    #[test]
    fn test_uncreatable_log_dir_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let log_path = blocker.join("logs");

        // Only subscriber installation may fail (another test may have
        // installed one already); the directory problem must not.
        let result = init_logging(Some(&log_path));
        assert!(result.is_ok() || matches!(result, Err(LoggingError::Init(_))));
        assert!(!log_path.exists());
    }
}
