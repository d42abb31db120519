#![allow(dead_code)]

use std::path::Path;

use serde_json::{json, Value};
use tunestatus::config::Config;
use tunestatus::credentials::{Credentials, SlackCredentials, SpotifyCredentials};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Basic auth for `client:secret`
pub const CLIENT_AUTH: &str = "Basic Y2xpZW50OnNlY3JldA==";

/// Settings that point every remote at `server`
pub fn config(server: &MockServer, credentials: &Path) -> Config {
    Config {
        credentials_path: credentials.to_path_buf(),
        spotify_accounts_url: server.uri(),
        spotify_api_url: format!("{}/v1", server.uri()),
        slack_api_url: format!("{}/slack", server.uri()),
        ..Default::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        slack: SlackCredentials {
            legacy_api_token: "xoxp-1".to_string(),
        },
        spotify: SpotifyCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            access_token: "access-0".to_string(),
            refresh_token: "refresh".to_string(),
            access_token_expires_in: 3600,
        },
    }
}

pub fn write_credentials(path: &Path, credentials: &Credentials) {
    std::fs::write(path, serde_json::to_string_pretty(credentials).unwrap()).unwrap();
}

pub fn read_credentials(path: &Path) -> Credentials {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

pub fn token(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "scope": "user-read-playback-state",
        "expires_in": 3600
    })
}

pub fn track(name: &str, artists: &[&str]) -> Value {
    json!({
        "is_playing": true,
        "progress_ms": 1000,
        "item": {
            "type": "track",
            "name": name,
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>()
        }
    })
}

pub async fn slack_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/slack/users.profile.set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(server)
        .await;
}

/// Bodies of every status update slack received, in order
pub async fn published(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/slack/users.profile.set")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
