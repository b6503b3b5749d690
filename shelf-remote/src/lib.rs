//! HTTP-backed collaborators for the game-shelf sync engine: the IGDB
//! catalog (behind a Twitch app session) and the Steam ownership list.

pub mod error;
pub mod igdb;
pub mod keys;
pub mod session;
pub mod steam;
pub mod types;

use std::time::Duration;

pub use error::RemoteError;
pub use igdb::IgdbClient;
pub use keys::{IgdbKeys, KeySource, SteamKeys, key_sources, keys_path};
pub use session::TwitchSession;
pub use steam::SteamClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Result<reqwest::Client, RemoteError> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("game-shelf/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
