use std::collections::HashMap;

use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

pub use auth::{AuthorizationRequest, TokenResponse};
pub use credentials::ClientCredentials;
pub use player::{Playback, PlayingItem};

use crate::error::{Error, Result};
use crate::logging::ResponseLogger;

pub mod auth;
mod credentials;
pub mod player;

pub static ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub static API_URL: &str = "https://api.spotify.com/v1";

/// Scopes requested during setup. Only the playback state is ever read.
pub static SCOPES: [&str; 1] = ["user-read-playback-state"];

/// Thin handle on the two spotify hosts: the accounts service that mints
/// tokens and the web api that reports playback.
#[derive(Debug, Clone)]
pub struct Spotify {
    http: reqwest::Client,
    accounts_url: String,
    api_url: String,
}

impl Spotify {
    pub fn new<A: AsRef<str>, B: AsRef<str>>(http: reqwest::Client, accounts_url: A, api_url: B) -> Self {
        Self {
            http,
            accounts_url: accounts_url.as_ref().trim_end_matches('/').to_string(),
            api_url: api_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    pub fn accounts_url(&self) -> &str {
        &self.accounts_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Raw response body kept around so failures can be classified after the fact
#[derive(Debug)]
pub(crate) struct SpotifyResponse {
    pub status: StatusCode,
    pub body: String,
}

impl SpotifyResponse {
    pub async fn from_response(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            ResponseLogger::log_error(status, &body);
        }
        Ok(Self { status, body })
    }

    /// Deserialize the body reporting the json path of the offending field
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let jd = &mut serde_json::Deserializer::from_str(&self.body);
        serde_path_to_error::deserialize(jd).map_err(|e| Error::Remote {
            code: self.status.as_u16(),
            message: format!("malformed response: {e}"),
        })
    }

    /// Best effort human readable message from either error shape spotify uses.
    ///
    /// The accounts service answers `{"error": "...", "error_description": "..."}`
    /// while the web api answers `{"error": {"status": 401, "message": "..."}}`.
    pub fn message(&self) -> String {
        match serde_json::from_str::<HashMap<String, serde_json::Value>>(&self.body) {
            Ok(body) => {
                if let Some(description) = body.get("error_description").and_then(|v| v.as_str()) {
                    return description.to_string();
                }
                match body.get("error") {
                    Some(serde_json::Value::String(error)) => error.clone(),
                    Some(serde_json::Value::Object(error)) => error
                        .get("message")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    _ => self.status.to_string(),
                }
            }
            Err(_) if self.body.is_empty() => self.status.to_string(),
            Err(_) => self.body.clone(),
        }
    }

    /// OAuth error code from the accounts service, e.g. `invalid_grant`
    pub fn oauth_error(&self) -> Option<String> {
        let body: HashMap<String, serde_json::Value> = serde_json::from_str(&self.body).ok()?;
        body.get("error")?.as_str().map(|v| v.to_string())
    }
}

impl Spotify {
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) async fn send(&self, request: reqwest::RequestBuilder) -> Result<SpotifyResponse> {
        let response = request.send().await?;
        debug!("spotify {} {}", response.status(), response.url().path());
        SpotifyResponse::from_response(response).await
    }
}
