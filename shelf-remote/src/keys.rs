//! API keys for the catalog and the storefronts.
//!
//! Keys are read from environment variables first, then from
//! `~/.config/game-shelf/keys.toml`:
//!
//! ```toml
//! [igdb]
//! client_id = "..."
//! client_secret = "..."
//!
//! [steam]
//! api_key = "..."
//! user_id = "7656119..."
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::RemoteError;

pub const IGDB_CLIENT_ID_VAR: &str = "IGDB_CLIENT_ID";
pub const IGDB_CLIENT_SECRET_VAR: &str = "IGDB_CLIENT_SECRET";
pub const STEAM_API_KEY_VAR: &str = "STEAM_API_KEY";
pub const STEAM_USER_ID_VAR: &str = "STEAM_USER_ID";

/// Twitch application credentials used to open an IGDB session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgdbKeys {
    pub client_id: String,
    pub client_secret: String,
}

/// Steam Web API key plus the 64-bit id of the user whose library is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamKeys {
    pub api_key: String,
    pub user_id: String,
}

/// Where a key's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    EnvVar(&'static str),
    ConfigFile,
    Missing,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "keys file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// TOML keys file format.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeysFile {
    #[serde(default)]
    igdb: IgdbSection,
    #[serde(default)]
    steam: SteamSection,
}

#[derive(Debug, Default, Deserialize)]
struct IgdbSection {
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SteamSection {
    api_key: Option<String>,
    user_id: Option<String>,
}

impl KeysFile {
    fn field(&self, var: &str) -> Option<&String> {
        match var {
            IGDB_CLIENT_ID_VAR => self.igdb.client_id.as_ref(),
            IGDB_CLIENT_SECRET_VAR => self.igdb.client_secret.as_ref(),
            STEAM_API_KEY_VAR => self.steam.api_key.as_ref(),
            STEAM_USER_ID_VAR => self.steam.user_id.as_ref(),
            _ => None,
        }
    }
}

/// Resolve one key: env var wins over the keys file. Blank values count as
/// unset.
fn lookup(
    var: &'static str,
    env: &impl Fn(&str) -> Option<String>,
    file: &KeysFile,
) -> Option<String> {
    non_blank(env(var)).or_else(|| non_blank(file.field(var).cloned()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(
    var: &'static str,
    env: &impl Fn(&str) -> Option<String>,
    file: &KeysFile,
) -> Result<String, RemoteError> {
    lookup(var, env, file).ok_or_else(|| {
        RemoteError::Config(format!(
            "Missing {}. Set the env var or add it to {}",
            var,
            keys_path().display()
        ))
    })
}

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

impl IgdbKeys {
    /// Load from the environment and the keys file.
    pub fn load() -> Result<Self, RemoteError> {
        Self::resolve(&process_env, &load_keys_file(&keys_path()))
    }

    pub(crate) fn resolve(
        env: &impl Fn(&str) -> Option<String>,
        file: &KeysFile,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client_id: require(IGDB_CLIENT_ID_VAR, env, file)?,
            client_secret: require(IGDB_CLIENT_SECRET_VAR, env, file)?,
        })
    }
}

impl SteamKeys {
    /// Load from the environment and the keys file.
    pub fn load() -> Result<Self, RemoteError> {
        Self::resolve(&process_env, &load_keys_file(&keys_path()))
    }

    pub(crate) fn resolve(
        env: &impl Fn(&str) -> Option<String>,
        file: &KeysFile,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            api_key: require(STEAM_API_KEY_VAR, env, file)?,
            user_id: require(STEAM_USER_ID_VAR, env, file)?,
        })
    }
}

/// Path of the keys file.
pub fn keys_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("game-shelf")
        .join("keys.toml")
}

/// Report where each key is coming from, without revealing values.
pub fn key_sources() -> Vec<(&'static str, KeySource)> {
    sources(&process_env, &load_keys_file(&keys_path()))
}

fn sources(
    env: &impl Fn(&str) -> Option<String>,
    file: &KeysFile,
) -> Vec<(&'static str, KeySource)> {
    [
        IGDB_CLIENT_ID_VAR,
        IGDB_CLIENT_SECRET_VAR,
        STEAM_API_KEY_VAR,
        STEAM_USER_ID_VAR,
    ]
    .into_iter()
    .map(|var| {
        let source = if non_blank(env(var)).is_some() {
            KeySource::EnvVar(var)
        } else if non_blank(file.field(var).cloned()).is_some() {
            KeySource::ConfigFile
        } else {
            KeySource::Missing
        };
        (var, source)
    })
    .collect()
}

pub(crate) fn load_keys_file(path: &Path) -> KeysFile {
    let Ok(content) = std::fs::read_to_string(path) else {
        return KeysFile::default();
    };
    match toml::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Ignoring invalid keys file {}: {}", path.display(), e);
            KeysFile::default()
        }
    }
}
