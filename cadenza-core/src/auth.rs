//! OAuth 2.0 authorization against the streaming service's account
//! endpoints.
//!
//! Two grants are used:
//! - Authorization code exchange (`code` -> [`Credential`]) after the user
//!   approves access in a browser
//! - Refresh grant (`refresh_token` -> [`Credential`]) for unattended
//!   renewal
//!
//! Both calls carry a bounded timeout; a slow authorization endpoint is a
//! transient, reportable failure, never a hang.

use chrono::Utc;
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, RefreshToken, RequestTokenError, Scope, TokenResponse,
    TokenUrl,
};
use thiserror::Error;
use tokio::time::timeout;

use crate::credential::Credential;
use crate::store::{Secret, StoreError};

/// Default authorization endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Default token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Scopes required for playback control and status queries.
pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "streaming",
    "app-remote-control",
];

const TOKEN_ENDPOINT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Error type for credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable credential: the user must complete the authorization flow.
    #[error("not authenticated; complete the authorization flow first")]
    NotAuthenticated,

    /// The authorization server rejected the refresh token.
    #[error("token refresh rejected: {message}")]
    RefreshRejected { message: String },

    /// The persisted credential could not be read or written.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The authorization request itself failed (configuration, network,
    /// or a malformed response).
    #[error("authorization request failed: {message}")]
    OAuth { message: String },

    /// The authorization endpoint did not answer in time.
    #[error("authorization endpoint timed out")]
    Timeout,
}

impl AuthError {
    /// Whether recovering from this error requires the user to
    /// re-authorize (as opposed to retrying).
    pub fn requires_reauthorization(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::RefreshRejected { .. })
    }
}

/// OAuth client configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl AuthConfig {
    /// Configuration against the real account endpoints with the default
    /// playback scopes.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Override the authorization endpoint.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Override the token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

/// Client for the authorization-code and refresh grants.
pub struct AuthClient {
    config: AuthConfig,
}

impl AuthClient {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    fn oauth_client(&self) -> Result<BasicClient, AuthError> {
        let auth_url = AuthUrl::new(self.config.auth_url.clone()).map_err(|e| AuthError::OAuth {
            message: format!("invalid auth URL: {}", e),
        })?;

        let token_url =
            TokenUrl::new(self.config.token_url.clone()).map_err(|e| AuthError::OAuth {
                message: format!("invalid token URL: {}", e),
            })?;

        let redirect_url =
            RedirectUrl::new(self.config.redirect_uri.clone()).map_err(|e| AuthError::OAuth {
                message: format!("invalid redirect URL: {}", e),
            })?;

        Ok(BasicClient::new(
            ClientId::new(self.config.client_id.clone()),
            self.config
                .client_secret
                .as_ref()
                .map(|s| ClientSecret::new(s.clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url))
    }

    /// Build the authorization URL for the user to visit.
    ///
    /// Returns the URL and the CSRF state token to verify on the redirect.
    pub fn authorize_url(&self) -> Result<(String, String), AuthError> {
        let client = self.oauth_client()?;

        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.config.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        let (url, state) = request.url();
        Ok((url.to_string(), state.secret().clone()))
    }

    /// Exchange an authorization code for a fresh credential.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, AuthError> {
        let client = self.oauth_client()?;

        let response = timeout(
            TOKEN_ENDPOINT_TIMEOUT,
            client
                .exchange_code(AuthorizationCode::new(code.to_string()))
                .request_async(async_http_client),
        )
        .await
        .map_err(|_| AuthError::Timeout)?
        .map_err(|e| AuthError::OAuth {
            message: format!("authorization code exchange failed: {}", e),
        })?;

        self.credential_from_response(response, None)
    }

    /// Exchange a refresh token for a renewed credential.
    ///
    /// When the server does not rotate the refresh token, the previous one
    /// is carried forward into the new credential.
    pub async fn refresh(&self, refresh_token: &Secret) -> Result<Credential, AuthError> {
        let client = self.oauth_client()?;

        let response = timeout(
            TOKEN_ENDPOINT_TIMEOUT,
            client
                .exchange_refresh_token(&RefreshToken::new(refresh_token.expose().to_string()))
                .request_async(async_http_client),
        )
        .await
        .map_err(|_| AuthError::Timeout)?
        .map_err(|e| match e {
            RequestTokenError::ServerResponse(_) => AuthError::RefreshRejected {
                message: e.to_string(),
            },
            other => AuthError::OAuth {
                message: format!("token refresh failed: {}", other),
            },
        })?;

        self.credential_from_response(response, Some(refresh_token))
    }

    fn credential_from_response(
        &self,
        response: oauth2::basic::BasicTokenResponse,
        previous_refresh: Option<&Secret>,
    ) -> Result<Credential, AuthError> {
        let access_token = response.access_token().secret().to_string();

        let expires_in = response.expires_in().ok_or_else(|| AuthError::OAuth {
            message: "token response did not include an expiry".to_string(),
        })?;
        let expires_at = Utc::now()
            + chrono::Duration::from_std(expires_in).map_err(|e| AuthError::OAuth {
                message: format!("invalid expiration duration: {}", e),
            })?;

        let mut credential = Credential::new(access_token, expires_at);

        if let Some(new_refresh) = response.refresh_token() {
            credential = credential.with_refresh_token(new_refresh.secret());
        } else if let Some(previous) = previous_refresh {
            credential = credential.with_refresh_token(previous.expose());
        }

        Ok(credential)
    }
}
