//! In-memory credential storage implementation.

use async_trait::async_trait;
use std::sync::RwLock;

use super::{CredentialRecord, CredentialStore, StoreError};
use crate::credential::Credential;

/// In-memory credential store for testing and development.
///
/// This store is not persistent; the credential is lost when the process
/// exits.
///
/// # Thread Safety
///
/// This implementation uses interior mutability via `RwLock` and is
/// safe to share across threads.
pub struct MemoryStore {
    record: RwLock<CredentialRecord>,
}

impl MemoryStore {
    /// Create a new store holding the unauthenticated sentinel.
    pub fn new() -> Self {
        Self {
            record: RwLock::new(CredentialRecord::sentinel()),
        }
    }

    /// Create a store pre-loaded with a credential.
    pub fn with_credential(credential: &Credential) -> Self {
        Self {
            record: RwLock::new(CredentialRecord::from_credential(credential)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let authenticated = self
            .record
            .read()
            .map(|r| r.clone().into_credential().is_some())
            .unwrap_or(false);
        f.debug_struct("MemoryStore")
            .field("authenticated", &authenticated)
            .finish()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        // The slot always exists in memory; nothing to create.
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        let record = self.record.read().map_err(|e| StoreError::LockPoisoned {
            message: format!("read lock poisoned: {}", e),
        })?;
        Ok(record.clone().into_credential())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut record = self.record.write().map_err(|e| StoreError::LockPoisoned {
            message: format!("write lock poisoned: {}", e),
        })?;
        *record = CredentialRecord::from_credential(credential);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut record = self.record.write().map_err(|e| StoreError::LockPoisoned {
            message: format!("write lock poisoned: {}", e),
        })?;
        *record = CredentialRecord::sentinel();
        Ok(())
    }
}
