use std::sync::Arc;

use dialoguer::{Input, Password};
use log::warn;
use serde::Deserialize;
use uuid::Uuid;

use super::{Credentials, Setup, SlackCredentials, SpotifyCredentials};
use crate::error::{Error, Result};
use crate::spotify::{AuthorizationRequest, ClientCredentials, Spotify};

static BEFORE_SLACK: [&str; 2] = [
    "Open \x1b[36mhttps://api.slack.com/apps\x1b[39m and create an app with the \x1b[33musers.profile:write\x1b[39m user scope",
    "Install it to your workspace and copy the \x1b[33mUser OAuth Token\x1b[39m",
];

static BEFORE_SPOTIFY: [&str; 3] = [
    "Open \x1b[36mhttps://developer.spotify.com/dashboard\x1b[39m and click 'Create app'",
    "Add the redirect URI shown below to the app settings",
    "Copy the client ID and client secret from the app settings",
];

/// First half of setup: everything the user pastes before authorizing spotify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub slack_token: String,
    pub client: ClientCredentials,
}

impl AppCredentials {
    pub fn new(slack_token: &str, client_id: &str, client_secret: &str) -> Result<Self> {
        let slack_token = required("slack token", slack_token)?;
        let client_id = required("spotify client id", client_id)?;
        let client_secret = required("spotify client secret", client_secret)?;
        Ok(Self {
            slack_token,
            client: ClientCredentials::new(&client_id, &client_secret),
        })
    }
}

fn required(name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::setup(format!("{name} is required")));
    }
    Ok(value.to_string())
}

/// Query parameters spotify appends to the redirect uri
#[derive(Debug, Deserialize)]
struct AuthResponse {
    code: Option<String>,
    error: Option<String>,
    state: Option<String>,
}

/// Pull the authorization code out of what the user pasted: either the bare
/// code or the whole redirect url.
pub fn parse_authorization_code(answer: &str, state: &Uuid) -> Result<String> {
    let answer = answer.trim();
    let query = match answer.split_once('?') {
        Some((_, query)) => query,
        None if answer.contains("code=") => answer,
        None => {
            if answer.is_empty() || answer.contains(char::is_whitespace) {
                return Err(Error::setup("authorization code is missing"));
            }
            return Ok(answer.to_string());
        }
    };

    let query = query.split('#').next().unwrap_or_default();
    let response: AuthResponse = serde_qs::from_str(query).map_err(Error::setup)?;
    if let Some(error) = response.error {
        return Err(Error::setup(format!("spotify denied access: {error}")));
    }

    // Validate state for cross-site request forgery
    if let Some(returned) = response.state {
        if returned != state.to_string() {
            return Err(Error::setup("invalid response state"));
        }
    }

    match response.code {
        Some(code) if !code.is_empty() => Ok(code),
        _ => Err(Error::setup("authorization code is missing")),
    }
}

/// The user facing half of setup. Answers are collected on the blocking pool.
pub trait Prompt: Send + Sync + 'static {
    fn collect_app_credentials(&self) -> Result<AppCredentials>;
    fn collect_authorization_code(&self, app: &AppCredentials, authorize_url: &str) -> Result<String>;
}

/// Prompts on the controlling terminal and opens the browser for consent
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    redirect: String,
}

impl TerminalPrompt {
    pub fn new(redirect: &str) -> Self {
        Self {
            redirect: redirect.to_string(),
        }
    }
}

impl Prompt for TerminalPrompt {
    fn collect_app_credentials(&self) -> Result<AppCredentials> {
        for (i, step) in BEFORE_SLACK.iter().enumerate() {
            println!("{}. {}", i + 1, step);
        }
        let slack_token: String = Password::new()
            .with_prompt("Slack token (hidden)")
            .interact()?;

        println!();
        for (i, step) in BEFORE_SPOTIFY.iter().enumerate() {
            println!("{}. {}", i + 1, step);
        }
        println!("   Redirect URI: \x1b[36m{}\x1b[39m", self.redirect);
        let client_id: String = Input::new()
            .with_prompt("Spotify client ID")
            .validate_with(|v: &String| required("client id", v).map(|_| ()).map_err(|e| e.to_string()))
            .interact_text()?;
        let client_secret: String = Password::new()
            .with_prompt("Spotify client secret (hidden)")
            .interact()?;

        AppCredentials::new(&slack_token, &client_id, &client_secret)
    }

    fn collect_authorization_code(&self, _app: &AppCredentials, authorize_url: &str) -> Result<String> {
        println!();
        println!("Grant access in the browser, then paste the code or the full URL you were redirected to.");
        if let Err(err) = open::that(authorize_url) {
            warn!("Failed to open the browser: {err}");
            println!("Open this URL manually: \x1b[36m{authorize_url}\x1b[39m");
        }

        Ok(Input::<String>::new()
            .with_prompt("Spotify authorization code")
            .interact_text()?)
    }
}

/// Two step setup: collect app credentials, then authorize spotify and trade
/// the code for tokens.
#[derive(Debug, Clone)]
pub struct InteractiveSetup<P> {
    prompt: Arc<P>,
    spotify: Spotify,
    redirect: String,
}

impl<P: Prompt> InteractiveSetup<P> {
    pub fn new(prompt: P, spotify: Spotify, redirect: &str) -> Self {
        Self {
            prompt: Arc::new(prompt),
            spotify,
            redirect: redirect.to_string(),
        }
    }

    /// Run a blocking prompt without holding up the runtime
    async fn ask<T, F>(&self, question: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&P) -> Result<T> + Send + 'static,
    {
        let prompt = Arc::clone(&self.prompt);
        match tokio::task::spawn_blocking(move || question(&prompt)).await {
            Ok(answer) => answer,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => Err(Error::setup(err)),
        }
    }
}

impl<P: Prompt> Setup for InteractiveSetup<P> {
    async fn run(&self) -> Result<Credentials> {
        let app = self.ask(|prompt| prompt.collect_app_credentials()).await?;

        let request = AuthorizationRequest::new(app.client.clone(), &self.redirect);
        let url = request.authorization_url(&self.spotify)?;
        let answer = {
            let app = app.clone();
            self.ask(move |prompt| prompt.collect_authorization_code(&app, &url))
                .await?
        };
        let code = parse_authorization_code(&answer, &request.state)?;

        let token = self.spotify.request_access_token(&request, &code).await?;
        Ok(Credentials {
            slack: SlackCredentials {
                legacy_api_token: app.slack_token,
            },
            spotify: SpotifyCredentials {
                client_id: app.client.client_id,
                client_secret: app.client.client_secret,
                access_token: token.access_token,
                refresh_token: token.refresh_token.unwrap_or_default(),
                access_token_expires_in: token.expires_in,
            },
        })
    }
}
