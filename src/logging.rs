// Tracing setup: human-readable logs on stderr, plus a plain-text copy in a
// log file for the long-running `run` mode.
//
// One file per process start, named after the start time, so a crash report
// DM can be matched against the full log afterwards.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "vandalwatch=info";

/// `<dir>/vandalwatch_<YYYY-MM-DD_HH-MM-SS>.log`
pub fn log_file_path(dir: &Path, started: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "vandalwatch_{}.log",
        started.format("%Y-%m-%d_%H-%M-%S")
    ))
}

/// Install the global subscriber. With `log_dir`, also append to a fresh log
/// file in it and return that file's path.
pub fn init(log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let log_file = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = log_file_path(dir, Local::now());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some((path, file))
        }
        None => None,
    };

    let (path, file_layer) = match log_file {
        Some((path, file)) => (
            Some(path),
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_named_after_start_time() {
        let started = Local.with_ymd_and_hms(2024, 6, 1, 9, 5, 3).unwrap();
        assert_eq!(
            log_file_path(Path::new("logs"), started),
            PathBuf::from("logs/vandalwatch_2024-06-01_09-05-03.log")
        );
    }
}
