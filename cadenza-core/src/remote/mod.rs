//! The remote playback API.
//!
//! This module provides:
//! - [`RemoteApi`] - Trait over the fixed playback operation set
//! - [`HttpRemote`] - HTTP implementation against the streaming service's
//!   Web API
//! - Payload types for playback state and search results
//!
//! Every operation takes a read-only access-token snapshot; the remote
//! client never touches the credential store.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::store::Secret;

mod http;
mod types;

pub use http::{HttpRemote, DEFAULT_API_BASE};
pub use types::{Album, Artist, Device, PlaybackState, Playlist, Track};

/// Error type for remote playback operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The account has no active playback device.
    #[error("no active playback device")]
    NoActiveDevice,

    /// Playback control requires a premium subscription.
    #[error("a premium subscription is required for this action")]
    PremiumRequired,

    /// The requested resource does not exist.
    #[error("the requested resource was not found")]
    NotFound,

    /// The access token was rejected by the remote service.
    #[error("the access token was rejected by the remote service")]
    Unauthorized,

    /// Network-level failure or timeout; retrying is reasonable.
    #[error("could not reach the remote service: {message}")]
    Transient { message: String },

    /// Unclassified remote failure; the raw detail is kept for diagnostics.
    #[error("remote service error (status {status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl RemoteError {
    /// Whether the failure is worth retrying as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Error body returned by the remote service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Translate a non-success response into a [`RemoteError`].
///
/// This is the only place that interprets the remote service's error
/// vocabulary; the reason strings are a versioned contract with the API.
pub(crate) fn classify_response(status: u16, body: &str) -> RemoteError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_default();

    match (status, detail.reason.as_deref()) {
        (_, Some("NO_ACTIVE_DEVICE")) => RemoteError::NoActiveDevice,
        (_, Some("PREMIUM_REQUIRED")) => RemoteError::PremiumRequired,
        (401, _) => RemoteError::Unauthorized,
        (404, _) => RemoteError::NotFound,
        (429, _) | (502, _) | (503, _) | (504, _) => RemoteError::Transient {
            message: detail
                .message
                .unwrap_or_else(|| format!("remote service returned status {}", status)),
        },
        _ => RemoteError::Unexpected {
            status,
            message: detail.message.unwrap_or_else(|| body.to_string()),
        },
    }
}

/// The fixed operation vocabulary of the remote playback API.
///
/// Implementations map each operation onto one account-bound endpoint and
/// classify failures into [`RemoteError`].
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Resume playback on the active device.
    async fn play(&self, token: &Secret) -> Result<(), RemoteError>;

    /// Start playback of the given track URIs.
    async fn play_tracks(&self, token: &Secret, uris: &[String]) -> Result<(), RemoteError>;

    /// Start playback of a context (playlist, album).
    async fn play_context(&self, token: &Secret, context_uri: &str) -> Result<(), RemoteError>;

    /// Pause playback.
    async fn pause(&self, token: &Secret) -> Result<(), RemoteError>;

    /// Skip to the next track.
    async fn skip_next(&self, token: &Secret) -> Result<(), RemoteError>;

    /// Skip to the previous track.
    async fn skip_previous(&self, token: &Secret) -> Result<(), RemoteError>;

    /// Set the playback volume, 0-100.
    async fn set_volume(&self, token: &Secret, level: u8) -> Result<(), RemoteError>;

    /// Seek to a position in the current track.
    async fn seek(&self, token: &Secret, position_ms: u64) -> Result<(), RemoteError>;

    /// Search for tracks.
    async fn search_tracks(
        &self,
        token: &Secret,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, RemoteError>;

    /// Search for playlists.
    async fn search_playlists(
        &self,
        token: &Secret,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Playlist>, RemoteError>;

    /// Current playback state, or `None` when nothing is active.
    async fn playback_state(&self, token: &Secret)
        -> Result<Option<PlaybackState>, RemoteError>;
}
