use reqwest::StatusCode;
use serde::Deserialize;

use super::Spotify;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Show {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayingItem {
    Track {
        name: String,
        #[serde(default)]
        artists: Vec<Artist>,
    },
    Episode {
        name: String,
        show: Show,
    },
    #[serde(other)]
    Unknown,
}

/// Subset of `GET /me/player`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Playback {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<PlayingItem>,
}

impl Spotify {
    /// Current playback state, `None` when no device is active
    pub async fn playback(&self, access_token: &str) -> Result<Option<Playback>> {
        let response = self
            .send(
                self.http()
                    .get(format!("{}/me/player", self.api_url()))
                    .query(&[("additional_types", "track,episode")])
                    .bearer_auth(access_token),
            )
            .await?;

        match response.status {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK if response.body.trim().is_empty() => Ok(None),
            StatusCode::OK => Ok(Some(response.json()?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::AuthError {
                code: response.status.as_u16(),
                message: response.message(),
            }),
            status => Err(Error::Remote {
                code: status.as_u16(),
                message: response.message(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_track() {
        let playback: Playback = serde_json::from_str(
            r#"{
                "is_playing": true,
                "progress_ms": 1000,
                "item": {
                    "type": "track",
                    "name": "Song B",
                    "duration_ms": 200000,
                    "artists": [{"name": "X", "id": "1"}, {"name": "Y", "id": "2"}]
                }
            }"#,
        )
        .unwrap();

        assert!(playback.is_playing);
        assert_eq!(
            playback.item,
            Some(PlayingItem::Track {
                name: "Song B".to_string(),
                artists: vec![
                    Artist { name: "X".to_string() },
                    Artist { name: "Y".to_string() }
                ],
            })
        );
    }

    #[test]
    fn parse_episode() {
        let playback: Playback = serde_json::from_str(
            r#"{"is_playing": true, "item": {"type": "episode", "name": "Ep 1", "show": {"name": "Pod"}}}"#,
        )
        .unwrap();
        assert_eq!(
            playback.item,
            Some(PlayingItem::Episode {
                name: "Ep 1".to_string(),
                show: Show { name: "Pod".to_string() },
            })
        );
    }

    #[test]
    fn parse_ad_without_item() {
        let playback: Playback = serde_json::from_str(
            r#"{"is_playing": true, "currently_playing_type": "ad", "item": null}"#,
        )
        .unwrap();
        assert_eq!(playback.item, None);
    }
}
