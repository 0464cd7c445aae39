//! Tracing setup: console output plus an append-only operator log file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "alert_receiver=debug,tower_http=debug,info"
    } else {
        "alert_receiver=info,tower_http=info,warn"
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// Falls back to console-only output when the log file cannot be opened.
pub fn init(log_file: &Path, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    match open_log_file(log_file) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .init();
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .init();
            warn!(
                "Could not open log file {}, logging to console only: {e}",
                log_file.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("alerts.log");

        std::io::Write::write_all(&mut open_log_file(&path).unwrap(), b"first\n").unwrap();
        std::io::Write::write_all(&mut open_log_file(&path).unwrap(), b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_fails_under_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        assert!(open_log_file(&blocker.join("alerts.log")).is_err());
    }

    #[test]
    fn test_default_filter() {
        assert!(default_filter(false).contains("alert_receiver=info"));
        assert!(default_filter(true).contains("alert_receiver=debug"));
    }
}
