use log::warn;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::{ClientCredentials, Spotify, SCOPES};
use crate::error::{Error, Result};

/// Body of a successful `/api/token` exchange
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// One authorization code grant in progress
///
/// Holds the `state` sent with the authorize url so the redirect can be
/// checked against it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client: ClientCredentials,
    pub redirect: String,
    pub state: Uuid,
}

impl AuthorizationRequest {
    pub fn new(client: ClientCredentials, redirect: &str) -> Self {
        Self {
            client,
            redirect: redirect.to_string(),
            state: Uuid::new_v4(),
        }
    }

    pub fn authorization_url(&self, spotify: &Spotify) -> Result<String> {
        Ok(format!(
            "{}/authorize?{}",
            spotify.accounts_url(),
            serde_urlencoded::to_string([
                ("client_id", self.client.client_id.clone()),
                ("response_type", "code".to_string()),
                ("redirect_uri", self.redirect.clone()),
                ("scope", SCOPES.join(" ")),
                ("state", self.state.to_string()),
                ("show_dialog", true.to_string()),
            ])?
        ))
    }
}

impl Spotify {
    /// Trade a one time authorization code for an access and refresh token
    pub async fn request_access_token(
        &self,
        request: &AuthorizationRequest,
        auth_code: &str,
    ) -> Result<TokenResponse> {
        let body = serde_urlencoded::to_string([
            ("grant_type", "authorization_code".to_string()),
            ("code", auth_code.to_string()),
            ("redirect_uri", request.redirect.clone()),
        ])?;

        let response = self
            .send(
                self.http()
                    .post(format!("{}/api/token", self.accounts_url()))
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .header("Authorization", format!("Basic {}", request.client.auth()))
                    .body(body),
            )
            .await?;

        if !response.status.is_success() {
            return Err(Error::setup(format!(
                "spotify refused the authorization code: {}",
                response.message()
            )));
        }

        let token: TokenResponse = response.json()?;
        if token.refresh_token.is_none() {
            return Err(Error::setup("spotify did not return a refresh token"));
        }
        Ok(token)
    }

    /// Mint a new access token from a refresh token
    pub async fn refresh(
        &self,
        client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenResponse> {
        let body = serde_urlencoded::to_string([
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
        ])?;

        let response = self
            .send(
                self.http()
                    .post(format!("{}/api/token", self.accounts_url()))
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .header("Authorization", format!("Basic {}", client.auth()))
                    .body(body),
            )
            .await?;

        match response.status {
            status if status.is_success() => {
                let token: TokenResponse = response.json()?;
                if token.refresh_token.as_deref().is_some_and(|t| t != refresh_token) {
                    warn!("spotify rotated the refresh token; the stored one is kept");
                }
                Ok(token)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
                if matches!(
                    response.oauth_error().as_deref(),
                    Some("invalid_grant") | Some("invalid_client")
                ) =>
            {
                Err(Error::AuthExpired(response.message()))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::AuthError {
                    code: response.status.as_u16(),
                    message: response.message(),
                })
            }
            status => Err(Error::Remote {
                code: status.as_u16(),
                message: response.message(),
            }),
        }
    }
}
