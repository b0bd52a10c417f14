//! Application settings.
//!
//! Settings are stored as TOML with kebab-case keys. Every field has a
//! default, so a partial file (or no file at all) is valid.
//!
//! ```toml
//! [navigator]
//! root-surface = "body"
//! overlap-policy = "queue"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! max-files = 3
//! directory = "logs"
//! ```

use anyhow::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_SURFACE: &str = "body";
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// What the navigator does with an operation issued while a transition on
/// the same surface has not yet signalled completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Apply immediately and leave overlapping requests to the engine.
    #[default]
    Passthrough,
    /// Hold the operation until the in-flight target has been shown.
    Queue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NavigatorSettings {
    /// Name of the fallback root surface.
    pub root_surface: String,
    pub overlap_policy: OverlapPolicy,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        NavigatorSettings {
            root_surface: DEFAULT_ROOT_SURFACE.to_string(),
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingSettings {
    pub enabled: bool,
    /// Filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Number of run logs to keep, `0` keeps all.
    pub max_files: usize,
    /// Relative to the current working directory.
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            enabled: true,
            level: "info".to_string(),
            max_files: 3,
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub navigator: NavigatorSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads settings from `path`, returning defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Settings::default());
        }

        crate::helpers::load_toml(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        crate::helpers::save_toml(self, path)
    }
}
