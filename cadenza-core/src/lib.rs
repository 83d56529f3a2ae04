//! # cadenza-core
//!
//! Core library for the cadenza playback remote control.
//!
//! This crate provides:
//! - The authorization credential, its persistent store, and a manager
//!   that transparently refreshes it before use
//! - A free-form command interpreter producing typed playback intents
//! - A dispatcher that executes intents against the remote playback API
//!   and classifies every outcome
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadenza_core::{
//!     auth::{AuthClient, AuthConfig},
//!     dispatch::Dispatcher,
//!     interpret,
//!     manager::CredentialManager,
//!     remote::HttpRemote,
//!     store::FileStore,
//! };
//!
//! let store = FileStore::open_default()?;
//! let auth = AuthClient::new(AuthConfig::new(client_id, client_secret, redirect_uri));
//! let dispatcher = Dispatcher::new(CredentialManager::new(store, auth), HttpRemote::new());
//!
//! let outcome = dispatcher.dispatch(interpret::parse("play bohemian rhapsody")).await?;
//! println!("{}", outcome.message);
//! ```

pub mod auth;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod interpret;
pub mod manager;
pub mod remote;
pub mod store;

// Re-export commonly used types at crate root
pub use auth::{AuthClient, AuthConfig, AuthError};
pub use credential::{Credential, EXPIRY_MARGIN_SECS};
pub use dispatch::{CommandOutcome, Dispatcher, PlaybackDetails};
pub use error::CadenzaError;
pub use interpret::{parse, Intent};
pub use manager::CredentialManager;
pub use remote::{HttpRemote, PlaybackState, RemoteApi, RemoteError, Track};
pub use store::{CredentialStore, FileStore, MemoryStore, Secret, StoreError};
