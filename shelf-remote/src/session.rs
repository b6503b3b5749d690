use chrono::{DateTime, TimeDelta, Utc};
use reqwest::RequestBuilder;

use crate::error::RemoteError;
use crate::keys::IgdbKeys;
use crate::types::TwitchTokenResponse;

pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Tokens this close to expiry (in seconds) are treated as expired already.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An app access token for the IGDB API, obtained through Twitch's
/// client-credentials flow.
///
/// Sessions are created explicitly with [`TwitchSession::connect`]. They are
/// never refreshed behind the caller's back: requests made with an expired
/// session fail with [`RemoteError::SessionExpired`].
#[derive(Debug, Clone)]
pub struct TwitchSession {
    client_id: String,
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl TwitchSession {
    pub async fn connect(http: &reqwest::Client, keys: &IgdbKeys) -> Result<Self, RemoteError> {
        Self::connect_to(http, TWITCH_TOKEN_URL, keys).await
    }

    /// Like [`connect`](Self::connect) against a different token endpoint.
    pub async fn connect_to(
        http: &reqwest::Client,
        token_url: &str,
        keys: &IgdbKeys,
    ) -> Result<Self, RemoteError> {
        let resp = http
            .post(token_url)
            .query(&[
                ("client_id", keys.client_id.as_str()),
                ("client_secret", keys.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::status(status, &text));
        }

        let token: TwitchTokenResponse = serde_json::from_str(&text)?;
        let session = Self::from_token(keys.client_id.clone(), token, Utc::now());
        log::debug!("Twitch session valid until {}", session.expires_at);
        Ok(session)
    }

    pub fn from_token(client_id: String, token: TwitchTokenResponse, now: DateTime<Utc>) -> Self {
        let lifetime = TimeDelta::try_seconds(token.expires_in.max(0)).unwrap_or(TimeDelta::zero());
        Self {
            client_id,
            access_token: token.access_token,
            expires_at: now + lifetime,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    /// Attach the IGDB auth headers to a request.
    pub(crate) fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        if self.is_expired() {
            return Err(RemoteError::SessionExpired);
        }
        Ok(req
            .header("Client-ID", &self.client_id)
            .bearer_auth(&self.access_token))
    }
}
