use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::ResponseLogger;

pub static API_URL: &str = "https://slack.com/api";

#[derive(Debug, Clone, Serialize)]
struct Profile<'a> {
    status_text: &'a str,
    status_emoji: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ProfileUpdate<'a> {
    profile: Profile<'a>,
}

/// Slack answers 200 for most failures and reports them in the envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Slack {
    http: reqwest::Client,
    api_url: String,
}

impl Slack {
    pub fn new<S: AsRef<str>>(http: reqwest::Client, api_url: S) -> Self {
        Self {
            http,
            api_url: api_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    /// `users.profile.set` with only the status fields
    pub async fn set_status(&self, token: &str, text: &str, emoji: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/users.profile.set", self.api_url))
            .bearer_auth(token)
            .json(&ProfileUpdate {
                profile: Profile {
                    status_text: text,
                    status_emoji: emoji,
                },
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("slack {status} users.profile.set");

        if status.is_client_error() || status.is_server_error() {
            ResponseLogger::log_error(status, &body);
            return Err(Error::PublishRejected(format!("[{}] {}", status.as_u16(), body.trim())));
        }

        match serde_json::from_str::<Envelope>(&body) {
            Ok(Envelope { ok: true, .. }) => Ok(()),
            Ok(Envelope { error, .. }) => {
                ResponseLogger::log_error(status, &body);
                Err(Error::PublishRejected(error.unwrap_or_else(|| "unknown error".to_string())))
            }
            Err(err) => Err(Error::Remote {
                code: status.as_u16(),
                message: format!("malformed response: {err}"),
            }),
        }
    }
}
