//! Records exchanged between the ownership source, the catalog and the
//! persisted library.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::platform::StorePlatform;

/// One game owned on a storefront, as reported by the ownership source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnedRecord {
    /// Store-specific id (e.g. the Steam app id).
    pub source_id: i64,
    /// Title as the store spells it.
    pub title: String,
    /// Store the record was fetched from.
    pub platform: StorePlatform,
}

impl OwnedRecord {
    pub fn new(platform: StorePlatform, source_id: i64, title: impl Into<String>) -> Self {
        Self {
            source_id,
            title: title.into(),
            platform,
        }
    }

    /// Whether both records denote the same ownership, regardless of title.
    pub fn same_source(&self, other: &OwnedRecord) -> bool {
        self.platform == other.platform && self.source_id == other.source_id
    }

    /// The ownership link this record becomes once it is resolved.
    pub fn link(&self) -> OwnershipLink {
        OwnershipLink {
            source_id: self.source_id,
            platform: self.platform,
        }
    }
}

/// A catalog hit returned by a title search or an id lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogCandidate {
    pub catalog_id: u64,
    pub title: String,
    pub cover_id: Option<u64>,
    pub franchise_ids: Vec<u64>,
    pub collection_id: Option<u64>,
    pub url: Option<String>,
    /// First release date as a unix timestamp.
    pub release_date: Option<i64>,
}

/// A candidate together with its distance from the record's title.
/// Lower scores are better matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub candidate: CatalogCandidate,
    pub score: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    pub id: u64,
    /// Image id used to build cover art URLs.
    pub image_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// A series of related games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// The winning candidate for a record plus whatever enrichment succeeded.
///
/// Each enrichment field is independent: a failed cover lookup leaves
/// `cover` empty without affecting `franchises` or `collection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGame {
    pub candidate: CatalogCandidate,
    pub cover: Option<Cover>,
    pub franchises: Vec<Franchise>,
    pub collection: Option<Collection>,
}

impl ResolvedGame {
    /// A winner with no enrichment attached yet.
    pub fn bare(candidate: CatalogCandidate) -> Self {
        Self {
            candidate,
            cover: None,
            franchises: Vec::new(),
            collection: None,
        }
    }
}

/// Result of reconciling one owned record. Every input record yields exactly
/// one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Resolved {
        record: OwnedRecord,
        game: ResolvedGame,
    },
    Unresolved {
        record: OwnedRecord,
    },
}

impl ReconciliationOutcome {
    pub fn record(&self) -> &OwnedRecord {
        match self {
            Self::Resolved { record, .. } | Self::Unresolved { record } => record,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Proof of ownership of a library entry on one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnershipLink {
    pub source_id: i64,
    pub platform: StorePlatform,
}

/// A canonical, catalog-backed game in the user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub catalog_id: u64,
    pub title: String,
    #[serde(default)]
    pub cover_image_id: Option<String>,
    #[serde(default)]
    pub franchise_ids: Vec<u64>,
    #[serde(default)]
    pub franchises: Vec<Franchise>,
    #[serde(default)]
    pub collection_id: Option<u64>,
    #[serde(default)]
    pub collection: Option<Collection>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub release_date: Option<i64>,
    pub ownership_links: Vec<OwnershipLink>,
}

impl LibraryEntry {
    /// Build a new entry from a resolved game owned through `link`.
    pub fn from_resolved(game: ResolvedGame, link: OwnershipLink) -> Self {
        let ResolvedGame {
            candidate,
            cover,
            franchises,
            collection,
        } = game;
        Self {
            catalog_id: candidate.catalog_id,
            title: candidate.title,
            cover_image_id: cover.map(|c| c.image_id),
            franchise_ids: candidate.franchise_ids,
            franchises,
            collection_id: candidate.collection_id,
            collection,
            url: candidate.url,
            release_date: candidate.release_date,
            ownership_links: vec![link],
        }
    }

    /// Attach an ownership link. Returns `false` if it was already present.
    pub fn add_link(&mut self, link: OwnershipLink) -> bool {
        if self.ownership_links.contains(&link) {
            return false;
        }
        self.ownership_links.push(link);
        true
    }

    /// Whether this entry is owned on `platform` under `source_id`.
    pub fn is_owned_as(&self, platform: StorePlatform, source_id: i64) -> bool {
        self.ownership_links
            .iter()
            .any(|l| l.platform == platform && l.source_id == source_id)
    }
}

/// Full persisted snapshot of one user's library.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LibraryState {
    #[serde(default)]
    pub entries: Vec<LibraryEntry>,
    /// Owned records that no catalog candidate could be matched to yet.
    #[serde(default)]
    pub unreconciled: Vec<OwnedRecord>,
}

impl LibraryState {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unreconciled.is_empty()
    }

    /// Source ids of `platform` that are already represented, either through
    /// an entry's ownership link or as a pending unreconciled record.
    pub fn known_source_ids(&self, platform: StorePlatform) -> HashSet<i64> {
        let linked = self
            .entries
            .iter()
            .flat_map(|e| e.ownership_links.iter())
            .filter(|l| l.platform == platform)
            .map(|l| l.source_id);
        let pending = self
            .unreconciled
            .iter()
            .filter(|r| r.platform == platform)
            .map(|r| r.source_id);
        linked.chain(pending).collect()
    }

    pub fn entry(&self, catalog_id: u64) -> Option<&LibraryEntry> {
        self.entries.iter().find(|e| e.catalog_id == catalog_id)
    }

    pub fn entry_mut(&mut self, catalog_id: u64) -> Option<&mut LibraryEntry> {
        self.entries.iter_mut().find(|e| e.catalog_id == catalog_id)
    }

    /// Unreconciled records that came from `platform`.
    pub fn unreconciled_on(&self, platform: StorePlatform) -> impl Iterator<Item = &OwnedRecord> {
        self.unreconciled.iter().filter(move |r| r.platform == platform)
    }
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
