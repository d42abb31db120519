//! On-disk credential document shared by slack and spotify.
//!
//! The document is created once by interactive setup and afterwards only the
//! spotify access token is rewritten, once per polling cycle.

use std::ffi::OsString;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::spotify::ClientCredentials;

mod setup;

pub use setup::{AppCredentials, InteractiveSetup, Prompt, TerminalPrompt};

pub static DEFAULT_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackCredentials {
    pub legacy_api_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Advisory lifetime of `access_token` in seconds. Never used for scheduling.
    pub access_token_expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub slack: SlackCredentials,
    pub spotify: SpotifyCredentials,
}

impl Credentials {
    pub fn chat_token(&self) -> &str {
        &self.slack.legacy_api_token
    }

    pub fn client(&self) -> ClientCredentials {
        ClientCredentials::new(&self.spotify.client_id, &self.spotify.client_secret)
    }

    pub fn access_token(&self) -> &str {
        &self.spotify.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.spotify.refresh_token
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Io(e.into()))
    }
}

/// Source of a brand new credential set, run when no file exists yet
pub trait Setup {
    fn run(&self) -> impl Future<Output = Result<Credentials>>;
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Credentials> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(self.path.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        let jd = &mut serde_json::Deserializer::from_str(&content);
        serde_path_to_error::deserialize(jd).map_err(|e| Error::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Run `setup` and write its result to a new file.
    ///
    /// Fails with [`Error::AlreadyExists`] before prompting when the file is
    /// present, and the write itself is exclusive so a file that appears while
    /// the user is answering prompts is left untouched.
    pub async fn create_interactive<S: Setup>(&self, setup: &S) -> Result<Credentials> {
        if tokio::fs::try_exists(&self.path).await? {
            return Err(Error::AlreadyExists(self.path.clone()));
        }

        let credentials = setup.run().await?;
        self.create(&credentials).await?;
        info!("Saved credentials to {}", self.path.display());
        Ok(credentials)
    }

    /// Load the credentials, running first time setup when there are none
    pub async fn get<S: Setup>(&self, setup: &S) -> Result<Credentials> {
        match self.load().await {
            Err(Error::NotFound(_)) => {
                info!("No credentials found at {}, starting setup", self.path.display());
                self.create_interactive(setup).await
            }
            other => other,
        }
    }

    /// Replace the spotify access token, re-reading the document from disk
    /// first so edits made to any other field are preserved.
    ///
    /// The new document is synced to a sibling file and renamed over the old
    /// one, so the file on disk is always either the old or the new version.
    pub async fn update_access_token(&self, access_token: &str) -> Result<Credentials> {
        let mut credentials = self.load().await?;
        credentials.spotify.access_token = access_token.to_string();

        let staged = self.stage(&credentials).await?;
        if let Err(err) = tokio::fs::rename(&staged, &self.path).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(err.into());
        }
        debug!("Stored new access token in {}", self.path.display());
        Ok(credentials)
    }

    /// Link a fully written copy into place, failing if the file exists
    async fn create(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staged = self.stage(credentials).await?;
        let linked = tokio::fs::hard_link(&staged, &self.path).await;
        let _ = tokio::fs::remove_file(&staged).await;

        match linked {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(Error::AlreadyExists(self.path.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(DEFAULT_PATH));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the document next to the real file and sync it to disk
    async fn stage(&self, credentials: &Credentials) -> Result<PathBuf> {
        let staged = self.staging_path();
        let contents = credentials.to_json()?;

        let written = async {
            let mut file = tokio::fs::File::create(&staged).await?;
            file.write_all(contents.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        match written {
            Ok(()) => Ok(staged),
            Err(err) => {
                let _ = tokio::fs::remove_file(&staged).await;
                Err(err.into())
            }
        }
    }
}
