use serde::Deserialize;
use shelf_core::{CatalogCandidate, Collection, Cover, Franchise, OwnedRecord, StorePlatform};

/// Response of the Twitch client-credentials token endpoint.
#[derive(Debug, Deserialize)]
pub struct TwitchTokenResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A game from the IGDB `games` endpoint (`fields *;`). References to other
/// entities come back as bare ids.
#[derive(Debug, Deserialize, Clone)]
pub struct IgdbGame {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cover: Option<u64>,
    #[serde(default)]
    pub franchises: Vec<u64>,
    /// Main franchise, when IGDB singles one out.
    #[serde(default)]
    pub franchise: Option<u64>,
    #[serde(default)]
    pub collection: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub first_release_date: Option<i64>,
}

impl From<IgdbGame> for CatalogCandidate {
    fn from(game: IgdbGame) -> Self {
        let mut franchise_ids = game.franchises;
        if let Some(main) = game.franchise {
            if !franchise_ids.contains(&main) {
                franchise_ids.insert(0, main);
            }
        }
        Self {
            catalog_id: game.id,
            title: game.name,
            cover_id: game.cover,
            franchise_ids,
            collection_id: game.collection,
            url: game.url,
            release_date: game.first_release_date,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IgdbCover {
    pub id: u64,
    pub image_id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl From<IgdbCover> for Cover {
    fn from(cover: IgdbCover) -> Self {
        Self {
            id: cover.id,
            image_id: cover.image_id,
        }
    }
}

/// Shape shared by the `franchises` and `collections` endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct IgdbNamed {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl From<IgdbNamed> for Franchise {
    fn from(named: IgdbNamed) -> Self {
        Self {
            id: named.id,
            name: named.name,
            slug: named.slug,
        }
    }
}

impl From<IgdbNamed> for Collection {
    fn from(named: IgdbNamed) -> Self {
        Self {
            id: named.id,
            name: named.name,
            slug: named.slug,
        }
    }
}

/// Top-level wrapper of `IPlayerService/GetOwnedGames`.
#[derive(Debug, Deserialize)]
pub struct OwnedGamesResponse {
    pub response: OwnedGamesData,
}

/// Private profiles come back as an empty object, hence the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct OwnedGamesData {
    #[serde(default)]
    pub game_count: Option<u32>,
    #[serde(default)]
    pub games: Vec<SteamGame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SteamGame {
    pub appid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playtime_forever: u64,
}

impl SteamGame {
    pub fn into_record(self) -> OwnedRecord {
        OwnedRecord::new(StorePlatform::Steam, self.appid, self.name)
    }
}
