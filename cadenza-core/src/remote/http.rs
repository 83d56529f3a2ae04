//! HTTP implementation of [`RemoteApi`].

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{classify_response, PlaybackState, Playlist, RemoteApi, RemoteError, Track};
use crate::store::Secret;

/// Base URL of the streaming service's Web API.
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Bound on every remote call; a timeout is a transient failure, not a
/// hang.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Remote playback API over HTTP.
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Client against the real Web API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Client against an alternative base URL (tests point this at a mock
    /// server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Response, RemoteError> {
        request
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| RemoteError::Transient {
                message: e.to_string(),
            })
    }

    async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_response(status.as_u16(), &body))
    }

    /// Issue a command-style request where only success matters.
    async fn command(&self, request: reqwest::RequestBuilder) -> Result<(), RemoteError> {
        let response = self.execute(request).await?;
        Self::ensure_success(response).await.map(|_| ())
    }

    async fn search(
        &self,
        token: &Secret,
        query: &str,
        kind: &str,
        limit: u32,
    ) -> Result<SearchResponse, RemoteError> {
        let limit = limit.to_string();
        let request = self
            .http
            .get(self.url("/search"))
            .bearer_auth(token.expose())
            .query(&[("q", query), ("type", kind), ("limit", limit.as_str())]);
        let response = Self::ensure_success(self.execute(request).await?).await?;
        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| RemoteError::Unexpected {
                status: 200,
                message: format!("malformed search response: {}", e),
            })
    }
}

impl Default for HttpRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Option<Page<Track>>,
    #[serde(default)]
    playlists: Option<Page<Playlist>>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn play(&self, token: &Secret) -> Result<(), RemoteError> {
        self.command(
            self.http
                .put(self.url("/me/player/play"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn play_tracks(&self, token: &Secret, uris: &[String]) -> Result<(), RemoteError> {
        self.command(
            self.http
                .put(self.url("/me/player/play"))
                .bearer_auth(token.expose())
                .json(&json!({ "uris": uris })),
        )
        .await
    }

    async fn play_context(&self, token: &Secret, context_uri: &str) -> Result<(), RemoteError> {
        self.command(
            self.http
                .put(self.url("/me/player/play"))
                .bearer_auth(token.expose())
                .json(&json!({ "context_uri": context_uri })),
        )
        .await
    }

    async fn pause(&self, token: &Secret) -> Result<(), RemoteError> {
        self.command(
            self.http
                .put(self.url("/me/player/pause"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn skip_next(&self, token: &Secret) -> Result<(), RemoteError> {
        self.command(
            self.http
                .post(self.url("/me/player/next"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn skip_previous(&self, token: &Secret) -> Result<(), RemoteError> {
        self.command(
            self.http
                .post(self.url("/me/player/previous"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    async fn set_volume(&self, token: &Secret, level: u8) -> Result<(), RemoteError> {
        self.command(
            self.http
                .put(self.url("/me/player/volume"))
                .bearer_auth(token.expose())
                .query(&[("volume_percent", level.to_string())]),
        )
        .await
    }

    async fn seek(&self, token: &Secret, position_ms: u64) -> Result<(), RemoteError> {
        self.command(
            self.http
                .put(self.url("/me/player/seek"))
                .bearer_auth(token.expose())
                .query(&[("position_ms", position_ms.to_string())]),
        )
        .await
    }

    async fn search_tracks(
        &self,
        token: &Secret,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, RemoteError> {
        let response = self.search(token, query, "track", limit).await?;
        Ok(response.tracks.map(|page| page.items).unwrap_or_default())
    }

    async fn search_playlists(
        &self,
        token: &Secret,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Playlist>, RemoteError> {
        let response = self.search(token, query, "playlist", limit).await?;
        Ok(response.playlists.map(|page| page.items).unwrap_or_default())
    }

    async fn playback_state(
        &self,
        token: &Secret,
    ) -> Result<Option<PlaybackState>, RemoteError> {
        let request = self
            .http
            .get(self.url("/me/player"))
            .bearer_auth(token.expose());
        let response = self.execute(request).await?;

        // The API answers 204 with no body when nothing is active.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let response = Self::ensure_success(response).await?;
        let state = response
            .json::<PlaybackState>()
            .await
            .map_err(|e| RemoteError::Unexpected {
                status: 200,
                message: format!("malformed playback state: {}", e),
            })?;
        Ok(Some(state))
    }
}
