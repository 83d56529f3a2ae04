//! The authorization credential and its expiry rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Secret;

/// Safety margin, in seconds, subtracted from the expiry timestamp.
///
/// A token this close to expiring is treated as stale so it is never sent
/// on a request that could outlive it.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// One authorization grant for the account: the access/refresh token pair
/// plus its expiry and creation timestamps.
///
/// The credential is exclusively owned by the store; everything else works
/// with read-only snapshots. The refresh token, once obtained, is only
/// discarded on explicit logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived bearer token used on every remote call.
    pub access_token: Secret,

    /// Long-lived token exchanged for fresh access tokens.
    pub refresh_token: Option<Secret>,

    /// Absolute expiry of the access token.
    pub expires_at: DateTime<Utc>,

    /// When this grant was obtained.
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential with just an access token.
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: Secret::new(access_token),
            refresh_token: None,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Attach a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(Secret::new(refresh_token));
        self
    }

    /// True once the access token is within [`EXPIRY_MARGIN_SECS`] of its
    /// expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_at_exact_expiry() {
        let credential = Credential::new("token", Utc::now());
        assert!(credential.is_expired());
    }

    #[test]
    fn expired_within_safety_margin() {
        let credential = Credential::new("token", Utc::now() + Duration::seconds(30));
        assert!(credential.is_expired());
    }

    #[test]
    fn not_expired_just_past_margin() {
        let credential = Credential::new("token", Utc::now() + Duration::seconds(61));
        assert!(!credential.is_expired());
    }

    #[test]
    fn not_expired_well_before_expiry() {
        let credential = Credential::new("token", Utc::now() + Duration::hours(1));
        assert!(!credential.is_expired());
    }

    #[test]
    fn long_past_expiry() {
        let credential = Credential::new("token", Utc::now() - Duration::milliseconds(5000));
        assert!(credential.is_expired());
    }
}
