use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging: a console layer on stderr, plus a daily-rolling JSON
/// file layer when `directory` is given. `level` becomes the crate directive;
/// `RUST_LOG` can still add directives for other targets.
///
/// The returned guard flushes the file writer when dropped, so keep it alive
/// for the whole run.
pub fn init_logging(level: &str, directory: Option<&Path>) -> Option<WorkerGuard> {
    let directive = format!("genquakeml={}", level)
        .parse()
        .unwrap_or_else(|_| "genquakeml=info".parse().expect("static directive"));
    let filter = EnvFilter::from_default_env().add_directive(directive);

    // Console output goes to stderr; stdout carries the command's result
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match directory {
        Some(directory) if fs::create_dir_all(directory).is_ok() => {
            let file_appender = tracing_appender::rolling::daily(directory, "genquakeml.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        Some(directory) => {
            eprintln!("Could not create log directory {}", directory.display());
            (None, None)
        }
        None => (None, None),
    };

    // try_init so repeated initialization in tests is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}

/// Accepted values for the CLI log level selector
pub const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_with_directory_returns_guard() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        let guard = init_logging("debug", Some(&logs));
        assert!(guard.is_some());
        assert!(logs.is_dir());
    }

    #[test]
    fn test_init_without_directory() {
        assert!(init_logging("warn", None).is_none());
    }
}
