use log::debug;

use crate::activity::ActivityFetcher;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::Result;
use crate::spotify::Spotify;

/// Mints a fresh access token before every fetch.
///
/// The token is never reused between cycles, even when it has not expired,
/// and a refresh only completes once the new token is on disk.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    spotify: Spotify,
    store: CredentialStore,
}

impl TokenRefresher {
    pub fn new(spotify: Spotify, store: CredentialStore) -> Self {
        Self { spotify, store }
    }

    /// Refresh the access token, persist it and bring `credentials` in line
    /// with the stored document.
    pub async fn refresh(&self, credentials: &mut Credentials) -> Result<(String, ActivityFetcher)> {
        let token = self
            .spotify
            .refresh(&credentials.client(), credentials.refresh_token())
            .await?;

        *credentials = self.store.update_access_token(&token.access_token).await?;
        debug!("Refreshed spotify access token, valid for {}s", token.expires_in);

        Ok((token.access_token, ActivityFetcher::new(self.spotify.clone())))
    }
}
