//! Credential lifecycle management.
//!
//! [`CredentialManager`] owns the persisted credential slot and keeps it
//! usable: callers ask for a fresh credential and the manager transparently
//! renews a stale one via the refresh grant before handing it out.
//!
//! Renewal is lazy; nothing runs in the background. The next caller that
//! observes a stale credential drives the refresh.

use tokio::sync::Mutex;

use crate::auth::{AuthClient, AuthError};
use crate::credential::Credential;
use crate::store::{CredentialStore, StoreError};

/// Owns the credential slot and refreshes it on demand.
///
/// # Concurrency
///
/// Concurrent requests may observe a stale credential simultaneously.
/// Refreshes are serialized through a single-flight mutex: the first caller
/// through the gate performs the refresh, everyone else re-reads the store
/// after the gate opens and finds the renewed credential already there.
pub struct CredentialManager<S: CredentialStore> {
    store: S,
    auth: AuthClient,
    refresh_gate: Mutex<()>,
}

impl<S: CredentialStore> CredentialManager<S> {
    pub fn new(store: S, auth: AuthClient) -> Self {
        Self {
            store,
            auth,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Ensure the persisted credential slot exists. Idempotent.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.store.initialize().await
    }

    /// Current credential without renewal.
    pub async fn current(&self) -> Result<Credential, AuthError> {
        self.store
            .load()
            .await?
            .ok_or(AuthError::NotAuthenticated)
    }

    /// Get a credential that is safe to use right now, refreshing first if
    /// it is stale.
    ///
    /// On refresh failure the stored state is left untouched and the error
    /// says whether re-authorization is required.
    pub async fn ensure_fresh(&self) -> Result<Credential, AuthError> {
        let credential = self.current().await?;
        if !credential.is_expired() {
            tracing::debug!("using cached access token");
            return Ok(credential);
        }

        let _gate = self.refresh_gate.lock().await;

        // A concurrent request may have refreshed while we waited.
        let credential = self.current().await?;
        if !credential.is_expired() {
            tracing::debug!("credential was refreshed by a concurrent request");
            return Ok(credential);
        }

        let refresh_token = credential
            .refresh_token
            .as_ref()
            .ok_or(AuthError::NotAuthenticated)?;

        tracing::info!("access token expired, attempting refresh");
        let refreshed = match self.auth.refresh(refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                tracing::error!("token refresh failed: {}", e);
                return Err(e);
            }
        };

        self.store.save(&refreshed).await?;
        tracing::info!("access token refreshed");
        Ok(refreshed)
    }

    /// Authorization URL for the user to visit, plus the CSRF state to
    /// verify on the redirect.
    pub fn authorize_url(&self) -> Result<(String, String), AuthError> {
        self.auth.authorize_url()
    }

    /// Complete the authorization flow: exchange the code and persist the
    /// resulting credential.
    pub async fn complete_authorization(&self, code: &str) -> Result<Credential, AuthError> {
        let credential = self.auth.exchange_code(code).await?;
        self.store.save(&credential).await?;
        tracing::info!("authorization complete, credential stored");
        Ok(credential)
    }

    /// Discard the stored credential.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.store.clear().await
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
