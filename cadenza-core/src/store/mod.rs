//! Credential persistence.
//!
//! This module provides:
//! - [`Secret`] - A wrapper for token material that prevents accidental logging
//! - [`CredentialStore`] - Trait for the persisted credential slot
//! - [`FileStore`] - Durable JSON-file implementation
//! - [`MemoryStore`] - In-memory implementation for testing and development
//!
//! The store holds exactly one credential record. A record whose token
//! fields are null is the "not authenticated" sentinel; [`CredentialStore::load`]
//! reports it as `None`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::credential::Credential;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the value,
/// and the buffer is zeroed when dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

/// Error type for credential store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error reading or writing the credential record.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration directory not available.
    #[error("configuration directory not available")]
    ConfigDirUnavailable,

    /// Internal lock poisoning error.
    #[error("internal lock error: {message}")]
    LockPoisoned { message: String },
}

/// On-disk shape of the credential slot.
///
/// All-null token fields are the unauthenticated sentinel. The record is
/// always replaced wholesale, never patched field-by-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CredentialRecord {
    access_token: Option<Secret>,
    refresh_token: Option<Secret>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub(crate) fn sentinel() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn from_credential(credential: &Credential) -> Self {
        Self {
            access_token: Some(credential.access_token.clone()),
            refresh_token: credential.refresh_token.clone(),
            expires_at: Some(credential.expires_at),
            created_at: credential.created_at,
        }
    }

    /// Interpret the record, treating anything short of a complete access
    /// token + expiry pair as the unauthenticated sentinel.
    pub(crate) fn into_credential(self) -> Option<Credential> {
        let access_token = self.access_token?;
        let expires_at = self.expires_at?;
        Some(Credential {
            access_token,
            refresh_token: self.refresh_token,
            expires_at,
            created_at: self.created_at,
        })
    }
}

/// Abstraction over the persisted credential slot.
///
/// Implementations include:
/// - [`FileStore`] - Durable JSON file under the platform config directory
/// - [`MemoryStore`] - In-memory storage for testing
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Ensure a persisted credential record exists, creating the
    /// unauthenticated sentinel if none is present.
    ///
    /// Idempotent: an existing (possibly authenticated) record is never
    /// overwritten.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Retrieve the current credential.
    ///
    /// Returns `Ok(None)` when the sentinel or an incomplete record is
    /// present.
    async fn load(&self) -> Result<Option<Credential>, StoreError>;

    /// Replace the stored credential wholesale.
    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Reset the slot to the unauthenticated sentinel.
    async fn clear(&self) -> Result<(), StoreError>;
}
