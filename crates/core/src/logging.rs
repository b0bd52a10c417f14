//! Structured logging for navstack processes.
//!
//! Logs are JSON lines written to a per-run file through a non-blocking
//! appender:
//! - Files are named `navstack-<run_id>.json`, the run ID being a UUID v7
//! - Older run logs beyond `max-files` are removed at initialization
//! - The level comes from `RUST_LOG` when set, else from settings
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! max-files = 3
//! directory = "logs"
//! ```
//!
//! ```bash
//! RUST_LOG=navstack_core::navigator=debug,info ./navstack-emulator
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use navstack_core::settings::LoggingSettings;
//! use navstack_core::logging::{init_logging, shutdown_logging, get_run_id};
//!
//! init_logging(&LoggingSettings::default())?;
//! eprintln!("Started with run ID: {}", get_run_id());
//!
//! tracing::info!("Application started");
//!
//! shutdown_logging();
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::settings::LoggingSettings;
use anyhow::{Context, Error};
use std::fs;
use std::fs::DirEntry;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_FILE_PREFIX: &str = "navstack-";
const LOG_FILE_SUFFIX: &str = "json";
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

static LOG_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Identifier of this process run, stable once first requested.
///
/// ```
/// use navstack_core::logging::get_run_id;
///
/// assert_eq!(get_run_id(), get_run_id());
/// ```
pub fn get_run_id() -> &'static str {
    RUN_ID.get_or_init(|| Uuid::now_v7().to_string()).as_str()
}

/// Deletes the oldest run logs in `log_dir` so at most `max_files` remain.
///
/// Run IDs are UUID v7, so sorting file names sorts runs by start time.
/// `max_files == 0` disables the cleanup.
fn prune_run_logs(log_dir: &Path, max_files: usize) -> Result<(), Error> {
    if max_files == 0 {
        return Ok(());
    }

    let mut entries = run_log_entries(log_dir)?;
    if entries.len() <= max_files {
        return Ok(());
    }

    entries.sort_by_key(|entry| entry.file_name());
    let excess = entries.len() - max_files;
    for entry in entries.into_iter().take(excess) {
        fs::remove_file(entry.path())
            .with_context(|| format!("can't remove old log file {}", entry.path().display()))?;
    }

    Ok(())
}

fn run_log_entries(log_dir: &Path) -> Result<Vec<DirEntry>, Error> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(log_dir)
        .with_context(|| format!("can't read log directory {}", log_dir.display()))?
    {
        let entry = entry.context("can't read log directory entry")?;
        if is_run_log(&entry) {
            entries.push(entry);
        }
    }

    Ok(entries)
}

fn is_run_log(entry: &DirEntry) -> bool {
    let name = entry.file_name();
    let name = name.to_string_lossy();
    name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX)
}

/// Installs the global JSON subscriber described by `settings`.
///
/// Does nothing when logging is disabled. Must be called at most once per
/// process; a second call fails because a global subscriber is already set.
///
/// # Errors
///
/// Fails if the log directory can't be created or pruned, the appender
/// can't be built, the level directive is invalid, or a subscriber is
/// already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), Error> {
    if !settings.enabled {
        return Ok(());
    }

    let log_dir = std::env::current_dir()
        .context("can't get current working directory")?
        .join(&settings.directory);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("can't create log directory {}", log_dir.display()))?;

    prune_run_logs(&log_dir, settings.max_files)?;

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(format!("{}{}", LOG_FILE_PREFIX, get_run_id()))
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&log_dir)
        .context("can't initialize log file appender")?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(Mutex::new(Some(guard)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .with_current_span(true);

    tracing_subscriber::registry()
        .with(build_filter(settings)?)
        .with(fmt_layer)
        .try_init()
        .context("can't initialize tracing subscriber")?;

    tracing::info!(run_id = get_run_id(), version = VERSION, "logging started");

    Ok(())
}

/// Flushes buffered log lines, waiting at most five seconds.
pub fn shutdown_logging() {
    let Some(mutex) = LOG_GUARD.get() else {
        return;
    };

    let Some(guard) = mutex.lock().ok().and_then(|mut slot| slot.take()) else {
        return;
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        drop(guard);
        let _ = tx.send(());
    });

    let _ = rx.recv_timeout(FLUSH_TIMEOUT);
}

/// `RUST_LOG` wins over the configured level; an empty level means `info`.
fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, Error> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = match settings.level.trim() {
        "" => "info",
        level => level,
    };

    EnvFilter::builder()
        .parse(level)
        .with_context(|| format!("invalid logging level '{}'", level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_run_log(dir: &Path, index: usize) -> Result<(), Error> {
        let name = format!("{}{:04}.{}", LOG_FILE_PREFIX, index, LOG_FILE_SUFFIX);
        fs::write(dir.join(name), b"{}")?;
        Ok(())
    }

    fn run_log_names(dir: &Path) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = run_log_entries(dir)?
            .into_iter()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    #[test]
    fn prune_keeps_most_recent_runs() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        for index in 1..=4 {
            write_run_log(temp_dir.path(), index)?;
        }

        prune_run_logs(temp_dir.path(), 2)?;

        assert_eq!(
            run_log_names(temp_dir.path())?,
            vec!["navstack-0003.json".to_string(), "navstack-0004.json".to_string()]
        );
        Ok(())
    }

    #[test]
    fn prune_with_zero_limit_keeps_everything() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        for index in 1..=3 {
            write_run_log(temp_dir.path(), index)?;
        }

        prune_run_logs(temp_dir.path(), 0)?;

        assert_eq!(run_log_names(temp_dir.path())?.len(), 3);
        Ok(())
    }

    #[test]
    fn prune_ignores_foreign_files() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("notes.txt"), b"keep")?;
        fs::write(temp_dir.path().join("navstack-settings.toml"), b"keep")?;
        for index in 1..=3 {
            write_run_log(temp_dir.path(), index)?;
        }

        prune_run_logs(temp_dir.path(), 1)?;

        assert_eq!(run_log_names(temp_dir.path())?, vec!["navstack-0003.json".to_string()]);
        assert!(temp_dir.path().join("notes.txt").exists());
        assert!(temp_dir.path().join("navstack-settings.toml").exists());
        Ok(())
    }

    #[test]
    fn disabled_logging_touches_nothing() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let settings = LoggingSettings {
            enabled: false,
            directory: temp_dir.path().join("logs"),
            ..Default::default()
        };

        init_logging(&settings)?;

        assert!(!temp_dir.path().join("logs").exists());
        Ok(())
    }

    #[test]
    fn run_id_is_a_uuid() {
        assert!(Uuid::parse_str(get_run_id()).is_ok());
    }
}
