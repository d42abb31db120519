use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::credentials::{CredentialStore, Credentials, InteractiveSetup, Prompt, TerminalPrompt};
use crate::cycle::StatusCycle;
use crate::error::Result;
use crate::keyboard::KeyboardListener;
use crate::keymap::Keymaps;
use crate::refresher::TokenRefresher;
use crate::scheduler::{Cycle, Scheduler};
use crate::slack::Slack;
use crate::spotify::Spotify;
use crate::status::{PublishedStatus, StatusPublisher};

/// Everything built from the settings, shared by every command
pub struct App<P = TerminalPrompt> {
    config: Config,
    store: CredentialStore,
    spotify: Spotify,
    slack: Slack,
    setup: InteractiveSetup<P>,
}

/// One client for both services so they share a connection pool
fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

impl App<TerminalPrompt> {
    pub fn new(config: Config) -> Result<Self> {
        let prompt = TerminalPrompt::new(&config.redirect_uri);
        Self::with_prompt(config, prompt)
    }
}

impl<P: Prompt> App<P> {
    pub fn with_prompt(config: Config, prompt: P) -> Result<Self> {
        let http = http_client(config.request_timeout())?;
        let spotify = Spotify::new(http.clone(), &config.spotify_accounts_url, &config.spotify_api_url);
        let slack = Slack::new(http, &config.slack_api_url);
        let store = CredentialStore::new(&config.credentials_path);
        let setup = InteractiveSetup::new(prompt, spotify.clone(), &config.redirect_uri);

        Ok(Self {
            config,
            store,
            spotify,
            slack,
            setup,
        })
    }

    /// Stored credentials, running setup first when there are none
    pub async fn credentials(&self) -> Result<Credentials> {
        self.store.get(&self.setup).await
    }

    pub async fn status_cycle(&self) -> Result<StatusCycle> {
        let credentials = self.credentials().await?;
        Ok(StatusCycle::new(
            credentials,
            TokenRefresher::new(self.spotify.clone(), self.store.clone()),
            StatusPublisher::new(self.slack.clone(), &self.config.status_emoji),
        ))
    }

    pub async fn scheduler(&self, cancel: CancellationToken) -> Result<Scheduler<StatusCycle>> {
        Ok(Scheduler::new(self.status_cycle().await?, self.config.interval(), cancel))
    }

    /// Single cycle, no sleeping
    pub async fn once(&self) -> Result<PublishedStatus> {
        self.status_cycle().await?.run().await
    }

    pub async fn clear(&self) -> Result<()> {
        self.status_cycle().await?.clear().await
    }

    /// Poll until interrupted or until a cycle fails
    pub async fn run(&self, keys: bool) -> Result<()> {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut scheduler = self.scheduler(cancel.clone()).await?.with_commands(rx);

        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    signal = tokio::signal::ctrl_c() => match signal {
                        Ok(()) => {
                            info!("Interrupted, exiting...");
                            cancel.cancel();
                        }
                        Err(err) => warn!("Unable to listen for interrupts: {err}"),
                    }
                }
            }
        });

        let keyboard = if keys && KeyboardListener::is_available() {
            let keymaps = Keymaps::compile(&self.config.keymaps);
            Some(KeyboardListener::new(keymaps, cancel.clone(), tx).spawn()?)
        } else {
            debug!("Keyboard commands disabled");
            drop(tx);
            None
        };

        info!(
            "Publishing to slack every {}s, credentials in {}",
            self.config.interval,
            self.store.path().display()
        );
        let result = scheduler.run().await;

        cancel.cancel();
        if let Some(keyboard) = keyboard {
            let _ = keyboard.await;
        }
        let _ = interrupt.await;

        result
    }
}
