//! IGDB catalog client.
//!
//! Queries are Apicalypse bodies POSTed to the JSON endpoints of the v4 API.
//! The client does not rate limit; the reconciler takes a limiter slot before
//! every call.

use serde::de::DeserializeOwned;
use shelf_core::{CatalogCandidate, CatalogLookupService, Collection, Cover, Franchise, ShelfError};

use crate::error::RemoteError;
use crate::keys::IgdbKeys;
use crate::session::TwitchSession;
use crate::types::{IgdbCover, IgdbGame, IgdbNamed};

pub const IGDB_BASE_URL: &str = "https://api.igdb.com/v4";

const GAMES_ENDPOINT: &str = "games";
const COVERS_ENDPOINT: &str = "covers";
const FRANCHISES_ENDPOINT: &str = "franchises";
const COLLECTIONS_ENDPOINT: &str = "collections";

/// Authenticated client for the IGDB API.
pub struct IgdbClient {
    http: reqwest::Client,
    session: TwitchSession,
    base_url: String,
}

impl IgdbClient {
    /// Open a Twitch session for `keys` and build a client on top of it.
    pub async fn connect(keys: &IgdbKeys) -> Result<Self, RemoteError> {
        let http = crate::http_client()?;
        let session = TwitchSession::connect(&http, keys).await?;
        Ok(Self::with_session(http, session))
    }

    pub fn with_session(http: reqwest::Client, session: TwitchSession) -> Self {
        Self {
            http,
            session,
            base_url: IGDB_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (e.g. a caching proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn session(&self) -> &TwitchSession {
        &self.session
    }

    /// POST an Apicalypse query and decode the JSON array it returns.
    async fn query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: String,
    ) -> Result<Vec<T>, RemoteError> {
        log::debug!("IGDB /{}: {}", endpoint, body);
        let req = self
            .session
            .authorize(self.http.post(format!("{}/{}", self.base_url, endpoint)))?
            .body(body);

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::status(status, &text));
        }
        parse_list(&text)
    }

    async fn query_first<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: u64,
    ) -> Result<Option<T>, RemoteError> {
        let items = self.query(endpoint, ids_query(&[id])).await?;
        Ok(items.into_iter().next())
    }
}

impl CatalogLookupService for IgdbClient {
    async fn search_by_title(&self, title: &str) -> Result<Vec<CatalogCandidate>, ShelfError> {
        let games: Vec<IgdbGame> = self.query(GAMES_ENDPOINT, search_query(title)).await?;
        Ok(games.into_iter().map(CatalogCandidate::from).collect())
    }

    async fn get_game(&self, catalog_id: u64) -> Result<Option<CatalogCandidate>, ShelfError> {
        let game: Option<IgdbGame> = self.query_first(GAMES_ENDPOINT, catalog_id).await?;
        Ok(game.map(CatalogCandidate::from))
    }

    async fn get_cover(&self, cover_id: u64) -> Result<Option<Cover>, ShelfError> {
        let cover: Option<IgdbCover> = self.query_first(COVERS_ENDPOINT, cover_id).await?;
        Ok(cover.map(Cover::from))
    }

    async fn get_franchises(&self, ids: &[u64]) -> Result<Vec<Franchise>, ShelfError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let franchises: Vec<IgdbNamed> = self.query(FRANCHISES_ENDPOINT, ids_query(ids)).await?;
        Ok(franchises.into_iter().map(Franchise::from).collect())
    }

    async fn get_collection(&self, collection_id: u64) -> Result<Option<Collection>, ShelfError> {
        let collection: Option<IgdbNamed> =
            self.query_first(COLLECTIONS_ENDPOINT, collection_id).await?;
        Ok(collection.map(Collection::from))
    }
}

/// Full-text title search returning every field.
pub(crate) fn search_query(title: &str) -> String {
    format!("search \"{}\"; fields *;", escape(title))
}

/// Lookup of one or more records by id.
pub(crate) fn ids_query(ids: &[u64]) -> String {
    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("fields *; where id = ({});", ids.join(","))
}

/// Escape a value for use inside an Apicalypse string literal.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub(crate) fn parse_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, RemoteError> {
    serde_json::from_str(text).map_err(|e| {
        RemoteError::Api(format!(
            "Failed to parse IGDB response: {e}. Response: {}",
            text.chars().take(200).collect::<String>()
        ))
    })
}

#[cfg(test)]
#[path = "tests/igdb_tests.rs"]
mod tests;
