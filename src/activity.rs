use std::fmt::{Display, Formatter};

use crate::error::Result;
use crate::spotify::{Playback, PlayingItem, Spotify};

/// What was playing when the player was last asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySnapshot {
    pub title: String,
    pub artists: Vec<String>,
}

impl ActivitySnapshot {
    pub fn new<S: Into<String>>(title: S, artists: Vec<String>) -> Self {
        Self {
            title: title.into(),
            artists,
        }
    }
}

impl Display for ActivitySnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.artists.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.title, self.artists.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Playing(ActivitySnapshot),
    /// Nothing is playing. Still a valid state to publish.
    Nothing,
}

impl From<Option<Playback>> for Activity {
    fn from(value: Option<Playback>) -> Self {
        match value {
            Some(Playback {
                is_playing: true,
                item: Some(item),
            }) => match item {
                PlayingItem::Track { name, artists } => Activity::Playing(ActivitySnapshot::new(
                    name,
                    artists.into_iter().map(|a| a.name).collect(),
                )),
                PlayingItem::Episode { name, show } => {
                    Activity::Playing(ActivitySnapshot::new(name, vec![show.name]))
                }
                PlayingItem::Unknown => Activity::Nothing,
            },
            _ => Activity::Nothing,
        }
    }
}

/// Reads the current activity using an already refreshed access token
#[derive(Debug, Clone)]
pub struct ActivityFetcher {
    spotify: Spotify,
}

impl ActivityFetcher {
    pub fn new(spotify: Spotify) -> Self {
        Self { spotify }
    }

    pub async fn fetch_current_activity(&self, access_token: &str) -> Result<Activity> {
        Ok(Activity::from(self.spotify.playback(access_token).await?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spotify::player::{Artist, Show};

    #[test]
    fn display_without_artists() {
        assert_eq!(ActivitySnapshot::new("Song A", vec![]).to_string(), "Song A");
    }

    #[test]
    fn display_with_artists() {
        let snapshot = ActivitySnapshot::new("Song B", vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(snapshot.to_string(), "Song B - X, Y");
    }

    #[test]
    fn track_playback() {
        let playback = Playback {
            is_playing: true,
            item: Some(PlayingItem::Track {
                name: "Song B".to_string(),
                artists: vec![Artist { name: "X".to_string() }],
            }),
        };
        assert_eq!(
            Activity::from(Some(playback)),
            Activity::Playing(ActivitySnapshot::new("Song B", vec!["X".to_string()]))
        );
    }

    #[test]
    fn episode_uses_show_as_artist() {
        let playback = Playback {
            is_playing: true,
            item: Some(PlayingItem::Episode {
                name: "Ep 1".to_string(),
                show: Show { name: "Pod".to_string() },
            }),
        };
        assert_eq!(
            Activity::from(Some(playback)),
            Activity::Playing(ActivitySnapshot::new("Ep 1", vec!["Pod".to_string()]))
        );
    }

    #[test]
    fn nothing_playing() {
        assert_eq!(Activity::from(None), Activity::Nothing);

        let paused = Playback {
            is_playing: false,
            item: Some(PlayingItem::Track {
                name: "Song".to_string(),
                artists: vec![],
            }),
        };
        assert_eq!(Activity::from(Some(paused)), Activity::Nothing);

        let ad = Playback {
            is_playing: true,
            item: None,
        };
        assert_eq!(Activity::from(Some(ad)), Activity::Nothing);
    }
}
