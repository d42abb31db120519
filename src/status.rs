use std::fmt::{Display, Formatter};

use crate::activity::Activity;
use crate::error::Result;
use crate::slack::Slack;

pub static DEFAULT_EMOJI: &str = ":spotify:";

/// Slack silently rejects longer status texts
pub const MAX_STATUS_LENGTH: usize = 100;

/// The status that was just written to slack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStatus {
    pub text: String,
    pub emoji: String,
}

impl PublishedStatus {
    pub fn cleared() -> Self {
        Self {
            text: String::new(),
            emoji: String::new(),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.text.is_empty() && self.emoji.is_empty()
    }

    /// Status shown for `activity`, truncated on a char boundary
    pub fn for_activity(activity: &Activity, emoji: &str) -> Self {
        match activity {
            Activity::Playing(snapshot) => Self {
                text: snapshot.to_string().chars().take(MAX_STATUS_LENGTH).collect(),
                emoji: emoji.to_string(),
            },
            Activity::Nothing => Self::cleared(),
        }
    }
}

impl Display for PublishedStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_cleared() {
            write!(f, "(status cleared)")
        } else {
            write!(f, "{} {}", self.emoji, self.text)
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusPublisher {
    slack: Slack,
    emoji: String,
}

impl StatusPublisher {
    pub fn new(slack: Slack, emoji: &str) -> Self {
        Self {
            slack,
            emoji: emoji.to_string(),
        }
    }

    pub async fn publish(&self, activity: &Activity, chat_token: &str) -> Result<PublishedStatus> {
        let status = PublishedStatus::for_activity(activity, &self.emoji);
        self.slack.set_status(chat_token, &status.text, &status.emoji).await?;
        Ok(status)
    }

    pub async fn clear(&self, chat_token: &str) -> Result<PublishedStatus> {
        self.publish(&Activity::Nothing, chat_token).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::activity::ActivitySnapshot;

    #[test]
    fn status_for_track() {
        let activity = Activity::Playing(ActivitySnapshot::new("Song B", vec!["X".into(), "Y".into()]));
        let status = PublishedStatus::for_activity(&activity, DEFAULT_EMOJI);
        assert_eq!(status.text, "Song B - X, Y");
        assert_eq!(status.emoji, ":spotify:");
        assert_eq!(status.to_string(), ":spotify: Song B - X, Y");
    }

    #[test]
    fn nothing_clears_the_status() {
        let status = PublishedStatus::for_activity(&Activity::Nothing, DEFAULT_EMOJI);
        assert!(status.is_cleared());
        assert_eq!(status, PublishedStatus::cleared());
    }

    #[test]
    fn long_titles_are_truncated_on_char_boundaries() {
        let title = "é".repeat(150);
        let activity = Activity::Playing(ActivitySnapshot::new(title, vec![]));
        let status = PublishedStatus::for_activity(&activity, DEFAULT_EMOJI);
        assert_eq!(status.text.chars().count(), MAX_STATUS_LENGTH);
    }
}
