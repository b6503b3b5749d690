//! Steam ownership source backed by `IPlayerService/GetOwnedGames`.

use shelf_core::{OwnedRecord, OwnershipSource, ShelfError, StorePlatform};

use crate::error::RemoteError;
use crate::keys::SteamKeys;
use crate::types::OwnedGamesResponse;

pub const STEAM_API_URL: &str = "https://api.steampowered.com";
const OWNED_GAMES_PATH: &str = "IPlayerService/GetOwnedGames/v0001/";

/// Lists the games owned by one Steam account.
pub struct SteamClient {
    http: reqwest::Client,
    keys: SteamKeys,
    base_url: String,
}

impl SteamClient {
    pub fn new(keys: SteamKeys) -> Result<Self, RemoteError> {
        Ok(Self {
            http: crate::http_client()?,
            keys,
            base_url: STEAM_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the account's full ownership list.
    pub async fn fetch_owned_games(&self) -> Result<Vec<OwnedRecord>, RemoteError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, OWNED_GAMES_PATH))
            .query(&[
                ("key", self.keys.api_key.as_str()),
                ("steamid", self.keys.user_id.as_str()),
                ("include_appinfo", "true"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::status(status, &text));
        }

        let records = parse_owned_games(&text)?;
        log::info!(
            "Steam reports {} owned games for {}",
            records.len(),
            self.keys.user_id
        );
        Ok(records)
    }
}

impl OwnershipSource for SteamClient {
    fn platform(&self) -> StorePlatform {
        StorePlatform::Steam
    }

    async fn get_owned_records(&self) -> Result<Vec<OwnedRecord>, ShelfError> {
        Ok(self.fetch_owned_games().await?)
    }
}

pub(crate) fn parse_owned_games(text: &str) -> Result<Vec<OwnedRecord>, RemoteError> {
    let parsed: OwnedGamesResponse = serde_json::from_str(text)?;
    if parsed.response.game_count.is_none() {
        log::warn!("Steam returned no game list; is the profile's game details visibility public?");
    }
    Ok(parsed
        .response
        .games
        .into_iter()
        .map(|game| game.into_record())
        .collect())
}

#[cfg(test)]
#[path = "tests/steam_tests.rs"]
mod tests;
