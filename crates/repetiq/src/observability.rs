//! Logging and tracing bootstrap.
//!
//! Human-readable events go to stderr at the level selected by `-q`/`-v`
//! and the configured log level; a JSONL copy goes to a log file when one is
//! configured via `REPETIQ_LOG_PATH`, `REPETIQ_LOG_DIR`, or the `log_dir`
//! config key. `RUST_LOG` overrides the level selection entirely.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default log file name inside a log directory.
const LOG_FILE_NAME: &str = "repetiq.jsonl";

/// Where log output should go, resolved from env and config.
#[derive(Debug, Default)]
pub struct ObservabilityConfig {
    /// Explicit log file path (`REPETIQ_LOG_PATH`).
    log_path: Option<PathBuf>,
    /// Log directory (`REPETIQ_LOG_DIR`, then config `log_dir`).
    log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Resolve from environment variables, with the config file's `log_dir`
    /// as the lowest-precedence fallback.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        Self {
            log_path: std::env::var_os("REPETIQ_LOG_PATH").map(PathBuf::from),
            log_dir: std::env::var_os("REPETIQ_LOG_DIR")
                .map(PathBuf::from)
                .or(config_log_dir),
        }
    }

    /// The log file to write, if any: explicit path wins over directory.
    fn log_file(&self) -> Option<(PathBuf, String)> {
        if let Some(ref path) = self.log_path {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let file = path
                .file_name()
                .map_or_else(|| LOG_FILE_NAME.to_string(), |n| n.to_string_lossy().into_owned());
            return Some((dir, file));
        }
        self.log_dir
            .as_ref()
            .map(|dir| (dir.clone(), LOG_FILE_NAME.to_string()))
    }
}

/// Build the level filter from CLI flags and the configured level.
///
/// `RUST_LOG` takes over completely when set; otherwise `-q` forces errors
/// only, `-v` bumps to debug, `-vv` and beyond to trace.
pub fn env_filter(quiet: bool, verbose: u8, config_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => config_level,
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::new(level)
}

/// Keeps the non-blocking log writer alive for the process lifetime.
///
/// Dropping the guard flushes buffered log lines; hold it in `main`.
pub struct LogGuard(Option<WorkerGuard>);

/// Install the global subscriber. Call once, early.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<LogGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    let (file_layer, guard) = match config.log_file() {
        Some((dir, file)) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(&dir, &file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(LogGuard(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `RUST_LOG` takes over the filter entirely, so these assertions only
    /// hold when it is absent from the test environment.
    fn rust_log_unset() -> bool {
        std::env::var_os("RUST_LOG").is_none()
    }

    #[test]
    fn quiet_forces_error_level() {
        if !rust_log_unset() {
            return;
        }
        let filter = env_filter(true, 0, "info");
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn verbose_bumps_level() {
        if !rust_log_unset() {
            return;
        }
        assert_eq!(env_filter(false, 1, "info").to_string(), "debug");
        assert_eq!(env_filter(false, 3, "info").to_string(), "trace");
    }

    #[test]
    fn config_level_used_by_default() {
        if !rust_log_unset() {
            return;
        }
        assert_eq!(env_filter(false, 0, "warn").to_string(), "warn");
    }

    #[test]
    fn explicit_path_wins_over_directory() {
        let config = ObservabilityConfig {
            log_path: Some(PathBuf::from("/tmp/logs/run.jsonl")),
            log_dir: Some(PathBuf::from("/var/log")),
        };
        let (dir, file) = config.log_file().unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/logs"));
        assert_eq!(file, "run.jsonl");
    }

    #[test]
    fn no_destination_means_no_file() {
        assert!(ObservabilityConfig::default().log_file().is_none());
    }
}
