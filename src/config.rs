use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::keymap::{Action, KeyMap};
use crate::{credentials, scheduler, slack, spotify, status};

pub static CONFIG_FILES: [&str; 2] = ["tunestatus.yml", "tunestatus.yaml"];
pub static ENV_PREFIX: &str = "TUNESTATUS_";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the credential document lives
    pub credentials_path: PathBuf,
    /// Seconds between polling cycles
    pub interval: u64,
    /// Seconds before a request to spotify or slack is abandoned
    pub request_timeout: u64,
    pub status_emoji: String,
    pub redirect_uri: String,
    pub spotify_accounts_url: String,
    pub spotify_api_url: String,
    pub slack_api_url: String,
    pub keymaps: HashMap<KeyMap, Action>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from(credentials::DEFAULT_PATH),
            interval: scheduler::DEFAULT_INTERVAL.as_secs(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            status_emoji: status::DEFAULT_EMOJI.to_string(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
            spotify_accounts_url: spotify::ACCOUNTS_URL.to_string(),
            spotify_api_url: spotify::API_URL.to_string(),
            slack_api_url: slack::API_URL.to_string(),
            keymaps: HashMap::new(),
        }
    }
}

/// Values that may come from `TUNESTATUS_*` environment variables
#[derive(Debug, Default, Deserialize)]
pub struct EnvOverrides {
    pub credentials_path: Option<PathBuf>,
    pub interval: Option<u64>,
    pub request_timeout: Option<u64>,
    pub status_emoji: Option<String>,
    pub redirect_uri: Option<String>,
    pub spotify_accounts_url: Option<String>,
    pub spotify_api_url: Option<String>,
    pub slack_api_url: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        envy::prefixed(ENV_PREFIX).from_env().map_err(Error::config)
    }

    pub fn from_vars<I: IntoIterator<Item = (String, String)>>(vars: I) -> Result<Self> {
        envy::prefixed(ENV_PREFIX).from_iter(vars).map_err(Error::config)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        Self::parse(&content).map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// First file that exists wins, no file means defaults
    pub fn load_with_fallback<const N: usize>(paths: [&str; N]) -> Result<Self> {
        match paths.iter().map(PathBuf::from).find(|p| p.exists()) {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(Error::config)
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        if let Some(path) = env.credentials_path {
            self.credentials_path = path;
        }
        if let Some(interval) = env.interval {
            self.interval = interval;
        }
        if let Some(timeout) = env.request_timeout {
            self.request_timeout = timeout;
        }
        if let Some(emoji) = env.status_emoji {
            self.status_emoji = emoji;
        }
        if let Some(redirect) = env.redirect_uri {
            self.redirect_uri = redirect;
        }
        if let Some(url) = env.spotify_accounts_url {
            self.spotify_accounts_url = url;
        }
        if let Some(url) = env.spotify_api_url {
            self.spotify_api_url = url;
        }
        if let Some(url) = env.slack_api_url {
            self.slack_api_url = url;
        }
        self
    }

    pub fn validate(self) -> Result<Self> {
        if self.interval == 0 {
            return Err(Error::config("interval must be at least one second"));
        }
        if self.request_timeout == 0 {
            return Err(Error::config("request_timeout must be at least one second"));
        }
        if self.credentials_path.as_os_str().is_empty() {
            return Err(Error::config("credentials_path must not be empty"));
        }
        Ok(self)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
