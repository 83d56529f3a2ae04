//! Durable file-backed credential storage.
//!
//! The credential lives in a single JSON file, by default under the
//! platform configuration directory. Every mutation rewrites the record
//! wholesale: the new contents go to a temporary file in the same
//! directory which is then renamed over the old one, so a crash mid-write
//! can never leave a half-written record behind.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

use super::{CredentialRecord, CredentialStore, StoreError};
use crate::credential::Credential;

/// File-backed credential store.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the given file path.
    ///
    /// The file (and its parent directories) are created lazily on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default storage path: `credential.json` under the platform
    /// configuration directory.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let dirs = directories::ProjectDirs::from("io", "cadenza", "cadenza")
            .ok_or(StoreError::ConfigDirUnavailable)?;
        Ok(dirs.config_dir().join("credential.json"))
    }

    /// Create a store at the default location.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Get the storage path for this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> Result<Option<CredentialRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write_record(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;

        // Token material is readable by the owner only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&tmp)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp, perms)?;
        }

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "credential file already exists");
            return Ok(());
        }
        tracing::info!(path = %self.path.display(), "creating empty credential file");
        self.write_record(&CredentialRecord::sentinel())
    }

    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .read_record()?
            .and_then(CredentialRecord::into_credential))
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        self.write_record(&CredentialRecord::from_credential(credential))?;
        tracing::debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.write_record(&CredentialRecord::sentinel())?;
        tracing::info!("credential cleared");
        Ok(())
    }
}
