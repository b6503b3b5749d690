//! Shared application settings.
//!
//! Settings live in `~/.config/game-shelf/settings.toml`:
//!
//! ```toml
//! [sync]
//! qps = 4
//! max_workers = 8
//! state_dir = "/home/me/.local/share/game-shelf"
//! ```
//!
//! Every key is optional. A missing or unreadable file yields the defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::reconcile::DEFAULT_MAX_WORKERS;

/// Default catalog quota (IGDB free tier).
pub const DEFAULT_QPS: u32 = 4;

/// Directory holding `settings.toml` and `keys.toml`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("game-shelf")
}

/// Canonical path to the shared settings file.
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Where library snapshots are stored unless configured otherwise.
pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("game-shelf")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Catalog calls allowed per second.
    pub qps: u32,
    /// Records reconciled concurrently.
    pub max_workers: usize,
    /// Directory for library snapshots.
    pub state_dir: PathBuf,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            qps: DEFAULT_QPS,
            max_workers: DEFAULT_MAX_WORKERS,
            state_dir: default_state_dir(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    sync: Option<SyncSection>,
}

#[derive(Debug, Deserialize)]
struct SyncSection {
    qps: Option<u32>,
    max_workers: Option<usize>,
    state_dir: Option<PathBuf>,
}

impl SyncSettings {
    /// Load settings from the canonical settings file.
    pub fn load() -> Self {
        Self::from_file(&settings_path())
    }

    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Parse settings, falling back to defaults for anything missing or
    /// invalid.
    pub fn from_toml_str(contents: &str) -> Self {
        let file: SettingsFile = match toml::from_str(contents) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Ignoring invalid settings file: {}", e);
                SettingsFile::default()
            }
        };

        let mut settings = Self::default();
        if let Some(sync) = file.sync {
            if let Some(qps) = sync.qps.filter(|&q| q > 0) {
                settings.qps = qps;
            }
            if let Some(workers) = sync.max_workers.filter(|&w| w > 0) {
                settings.max_workers = workers;
            }
            if let Some(dir) = sync.state_dir {
                settings.state_dir = dir;
            }
        }
        settings
    }

    /// Apply a command-line state directory override.
    pub fn with_state_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.state_dir = dir;
        }
        self
    }
}
