use serde::{Deserialize, Serialize};

/// Storefront a game can be owned on.
///
/// Ownership records and the links stored on library entries are always
/// scoped to one of these, since source ids are only unique per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorePlatform {
    Steam,
    Gog,
    Egs,
}

const ALL_STORES: &[StorePlatform] = &[StorePlatform::Steam, StorePlatform::Gog, StorePlatform::Egs];

impl StorePlatform {
    /// All supported stores.
    pub fn all() -> &'static [StorePlatform] {
        ALL_STORES
    }

    /// Canonical short name used for CLI arguments and persisted links.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Steam => "steam",
            Self::Gog => "gog",
            Self::Egs => "egs",
        }
    }

    /// Human-readable store name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Steam => "Steam",
            Self::Gog => "GOG",
            Self::Egs => "Epic Games Store",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Steam => &[],
            Self::Gog => &["gog.com"],
            Self::Egs => &["epic", "epic games"],
        }
    }
}

impl std::fmt::Display for StorePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Error returned when a string cannot be parsed into a `StorePlatform`.
#[derive(Debug, Clone)]
pub struct StorePlatformParseError(pub String);

impl std::fmt::Display for StorePlatformParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown store: '{}'", self.0)
    }
}

impl std::error::Error for StorePlatformParseError {}

impl std::str::FromStr for StorePlatform {
    type Err = StorePlatformParseError;

    /// Parse a store from its short name or an alias (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_STORES
            .iter()
            .copied()
            .find(|store| store.short_name() == lower || store.aliases().contains(&lower.as_str()))
            .ok_or_else(|| StorePlatformParseError(s.to_string()))
    }
}
