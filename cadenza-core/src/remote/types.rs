//! Payload types for the remote playback API.
//!
//! Deserialized from the service's JSON; fields the remote control has no
//! use for are simply ignored.

use serde::{Deserialize, Serialize};

/// State of the account's playback session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackState {
    /// The device playback is bound to, when one is active.
    #[serde(default)]
    pub device: Option<Device>,

    #[serde(default)]
    pub is_playing: bool,

    /// Progress into the current item, in milliseconds.
    #[serde(default)]
    pub progress_ms: Option<u64>,

    /// The currently playing track, if any.
    #[serde(default)]
    pub item: Option<Track>,
}

/// A playback device registered to the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub volume_percent: Option<u8>,
}

/// A playable track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,

    pub uri: String,

    #[serde(default)]
    pub duration_ms: u64,

    #[serde(default)]
    pub artists: Vec<Artist>,

    #[serde(default)]
    pub album: Option<Album>,
}

impl Track {
    /// All artist names joined for display.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
}

/// A playlist usable as a playback context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,

    pub uri: String,
}
