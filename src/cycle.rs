use log::debug;

use crate::credentials::Credentials;
use crate::error::Result;
use crate::refresher::TokenRefresher;
use crate::scheduler::Cycle;
use crate::status::{PublishedStatus, StatusPublisher};

/// Refresh, fetch, publish
#[derive(Debug, Clone)]
pub struct StatusCycle {
    credentials: Credentials,
    refresher: TokenRefresher,
    publisher: StatusPublisher,
}

impl StatusCycle {
    pub fn new(credentials: Credentials, refresher: TokenRefresher, publisher: StatusPublisher) -> Self {
        Self {
            credentials,
            refresher,
            publisher,
        }
    }
}

impl Cycle for StatusCycle {
    type Output = PublishedStatus;

    async fn run(&mut self) -> Result<PublishedStatus> {
        let (token, fetcher) = self.refresher.refresh(&mut self.credentials).await?;
        let activity = fetcher.fetch_current_activity(&token).await?;
        debug!("Current activity: {activity:?}");
        self.publisher.publish(&activity, self.credentials.chat_token()).await
    }

    async fn clear(&mut self) -> Result<()> {
        self.publisher.clear(self.credentials.chat_token()).await?;
        Ok(())
    }
}
