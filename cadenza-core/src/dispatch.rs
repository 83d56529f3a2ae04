//! Intent execution against the remote playback API.
//!
//! The [`Dispatcher`] obtains a fresh credential, issues the remote
//! operation an [`Intent`] maps to, and folds the result into a
//! [`CommandOutcome`]. Credential and storage failures short-circuit
//! before any remote call; every remote failure is classified into a
//! user-facing outcome, never propagated raw.

use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::interpret::Intent;
use crate::manager::CredentialManager;
use crate::remote::{RemoteApi, RemoteError};
use crate::store::{CredentialStore, Secret};

/// Guidance shown when the account has no active playback device.
pub const NO_DEVICE_GUIDANCE: &str =
    "No active playback device found. Open the player on one of your devices and try again.";

/// Result of dispatching one intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub success: bool,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PlaybackDetails>,

    /// Echo of the original text for commands that were not understood.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_command: Option<String>,
}

impl CommandOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: None,
            original_command: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
            original_command: None,
        }
    }

    fn unknown(original: impl Into<String>) -> Self {
        Self {
            success: false,
            message: "I did not understand that command".to_string(),
            details: None,
            original_command: Some(original.into()),
        }
    }

    fn with_details(mut self, details: PlaybackDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Structured playback details attached to a status outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackDetails {
    pub track: String,

    /// Artist names joined with `", "`.
    pub artists: String,

    pub album: String,

    pub is_playing: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

/// Executes intents with a fresh credential per dispatch.
pub struct Dispatcher<S: CredentialStore, R: RemoteApi> {
    manager: CredentialManager<S>,
    remote: R,
}

impl<S: CredentialStore, R: RemoteApi> Dispatcher<S, R> {
    pub fn new(manager: CredentialManager<S>, remote: R) -> Self {
        Self { manager, remote }
    }

    pub fn manager(&self) -> &CredentialManager<S> {
        &self.manager
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Execute one intent.
    ///
    /// Credential problems (not authenticated, refresh rejected, storage
    /// failure) are returned as errors so the boundary can distinguish
    /// "authorize first" from a failed playback command; everything past
    /// the credential becomes a [`CommandOutcome`].
    pub async fn dispatch(&self, intent: Intent) -> Result<CommandOutcome, AuthError> {
        let credential = self.manager.ensure_fresh().await?;
        tracing::debug!(?intent, "dispatching command");
        Ok(self.execute(&credential.access_token, intent).await)
    }

    async fn execute(&self, token: &Secret, intent: Intent) -> CommandOutcome {
        match intent {
            Intent::Play => simple(self.remote.play(token).await, "Playback started"),
            Intent::Pause => simple(self.remote.pause(token).await, "Playback paused"),
            Intent::Next => simple(self.remote.skip_next(token).await, "Skipped to next track"),
            Intent::Previous => simple(
                self.remote.skip_previous(token).await,
                "Skipped to previous track",
            ),
            Intent::SetVolume(level) => simple(
                self.remote.set_volume(token, level).await,
                format!("Volume set to {}%", level),
            ),
            Intent::VolumeUp => self.step_volume(token, 10).await,
            Intent::VolumeDown => self.step_volume(token, -10).await,
            Intent::PlaySearchQuery(query) => self.search_and_play(token, &query).await,
            Intent::PlayPlaylistQuery(query) => self.play_playlist(token, &query).await,
            Intent::Status => self.status(token).await,
            Intent::Unknown(original) => CommandOutcome::unknown(original),
        }
    }

    /// Read the current volume and nudge it by `delta`, clamped to 0-100.
    async fn step_volume(&self, token: &Secret, delta: i16) -> CommandOutcome {
        let state = match self.remote.playback_state(token).await {
            Ok(state) => state,
            Err(e) => return outcome_for_error(e),
        };

        let current = state
            .as_ref()
            .and_then(|s| s.device.as_ref())
            .and_then(|d| d.volume_percent);
        let Some(current) = current else {
            return outcome_for_error(RemoteError::NoActiveDevice);
        };

        let target = (i16::from(current) + delta).clamp(0, 100) as u8;
        match self.remote.set_volume(token, target).await {
            Ok(()) => {
                let direction = if delta >= 0 { "increased" } else { "decreased" };
                CommandOutcome::ok(format!("Volume {} to {}%", direction, target))
            }
            Err(e) => outcome_for_error(e),
        }
    }

    async fn search_and_play(&self, token: &Secret, query: &str) -> CommandOutcome {
        let tracks = match self.remote.search_tracks(token, query, 1).await {
            Ok(tracks) => tracks,
            Err(e) => return outcome_for_error(e),
        };

        let Some(track) = tracks.into_iter().next() else {
            return CommandOutcome::failure(format!("No tracks found for \"{}\"", query));
        };

        match self
            .remote
            .play_tracks(token, std::slice::from_ref(&track.uri))
            .await
        {
            Ok(()) => CommandOutcome::ok(format!(
                "Playing \"{}\" by {}",
                track.name,
                track.artist_names()
            )),
            Err(e) => outcome_for_error(e),
        }
    }

    async fn play_playlist(&self, token: &Secret, query: &str) -> CommandOutcome {
        let playlists = match self.remote.search_playlists(token, query, 1).await {
            Ok(playlists) => playlists,
            Err(e) => return outcome_for_error(e),
        };

        let Some(playlist) = playlists.into_iter().next() else {
            return CommandOutcome::failure(format!("No playlists found for \"{}\"", query));
        };

        match self.remote.play_context(token, &playlist.uri).await {
            Ok(()) => CommandOutcome::ok(format!("Playing playlist \"{}\"", playlist.name)),
            Err(e) => outcome_for_error(e),
        }
    }

    async fn status(&self, token: &Secret) -> CommandOutcome {
        let state = match self.remote.playback_state(token).await {
            Ok(state) => state,
            // Lacking an active device is not a failure for a status query.
            Err(RemoteError::NoActiveDevice) => return CommandOutcome::ok(NO_DEVICE_GUIDANCE),
            Err(e) => return outcome_for_error(e),
        };

        let Some(state) = state else {
            return CommandOutcome::ok("Not currently playing anything");
        };
        let Some(item) = &state.item else {
            return CommandOutcome::ok("Not currently playing anything");
        };

        let artists = item.artist_names();
        let details = PlaybackDetails {
            track: item.name.clone(),
            artists: artists.clone(),
            album: item
                .album
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            is_playing: state.is_playing,
            volume: state.device.as_ref().and_then(|d| d.volume_percent),
            device: state.device.as_ref().map(|d| d.name.clone()),
        };

        CommandOutcome::ok(format!("Currently playing \"{}\" by {}", item.name, artists))
            .with_details(details)
    }
}

fn simple(result: Result<(), RemoteError>, message: impl Into<String>) -> CommandOutcome {
    match result {
        Ok(()) => CommandOutcome::ok(message),
        Err(e) => outcome_for_error(e),
    }
}

/// Fold a remote failure into a user-facing outcome.
fn outcome_for_error(err: RemoteError) -> CommandOutcome {
    tracing::warn!(error = %err, "remote command failed");
    let message = match &err {
        RemoteError::NoActiveDevice => NO_DEVICE_GUIDANCE.to_string(),
        RemoteError::PremiumRequired => {
            "This action requires a premium subscription".to_string()
        }
        RemoteError::NotFound => "The requested item was not found".to_string(),
        RemoteError::Unauthorized => {
            "The streaming service rejected the authorization; try logging in again".to_string()
        }
        RemoteError::Transient { message } => {
            format!("The streaming service could not be reached: {}", message)
        }
        RemoteError::Unexpected { .. } => format!("Failed to process command: {}", err),
    };
    CommandOutcome::failure(message)
}
