//! Top-level error type for cadenza.

use thiserror::Error;

use crate::auth::AuthError;
use crate::remote::RemoteError;
use crate::store::StoreError;

/// Top-level error type encompassing all cadenza errors.
#[derive(Debug, Error)]
pub enum CadenzaError {
    /// Error from credential storage.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the credential lifecycle.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Error from the remote playback API.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}
