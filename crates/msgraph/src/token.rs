//! Cached OAuth2 access tokens
//!
//! [`AccessToken`] is what [`crate::GraphApi::get_token`] hands out. It is
//! reused until it is within [`EXPIRY_MARGIN_SECS`] of its expiry, after
//! which the client fetches a new one.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use oauth2::basic::{BasicTokenResponse, BasicTokenType};
use oauth2::TokenResponse;

/// Seconds before the reported expiry at which a token is treated as expired
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// An OAuth2 bearer token obtained through the client-credentials grant
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    token_type: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token from its parts
    pub fn new(
        secret: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            secret: secret.into(),
            token_type: token_type.into(),
            expires_at,
        }
    }

    /// Converts an OAuth2 token endpoint response, anchoring `expires_in` at `now`
    pub(crate) fn from_response(response: &BasicTokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| now + d);

        Self {
            secret: response.access_token().secret().to_string(),
            token_type: match response.token_type() {
                BasicTokenType::Bearer => "bearer".to_string(),
                BasicTokenType::Mac => "mac".to_string(),
                BasicTokenType::Extension(other) => other.clone(),
            },
            expires_at,
        }
    }

    /// The raw bearer token
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Token type as reported by the server (normally `bearer`)
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token is expired, or about to be, at `now`
    ///
    /// Tokens without a reported expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|exp| now + Duration::seconds(EXPIRY_MARGIN_SECS) >= exp)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
