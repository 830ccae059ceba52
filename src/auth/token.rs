//! Access tokens and the provider seam.
//!
//! Token values are zeroized on drop and never printed by `Debug`.

use std::env;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::TokenError;

/// Environment variable read by [`StaticTokenProvider::from_env`].
pub const ACCESS_TOKEN_ENV: &str = "GRAPH_ACCESS_TOKEN";

/// An access token with an optional expiry.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken {
    value: String,
    #[zeroize(skip)]
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The raw token value.
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Tokens without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of access tokens for a set of scopes.
///
/// Implementations own acquisition, refresh and caching, and must be safe to
/// call from concurrent requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self, scopes: &[String]) -> Result<AccessToken, TokenError>;
}

/// Provider that hands out one pre-acquired token.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<AccessToken>,
}

impl StaticTokenProvider {
    pub fn new(token: AccessToken) -> Self {
        Self { token: Some(token) }
    }

    /// A provider with no token; every request for one fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the token from `GRAPH_ACCESS_TOKEN`. Unset or empty means no token.
    pub fn from_env() -> Self {
        match env::var(ACCESS_TOKEN_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(AccessToken::new(value.trim())),
            _ => Self::empty(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self, scopes: &[String]) -> Result<AccessToken, TokenError> {
        let token = self.token.as_ref().ok_or_else(|| TokenError::NotAvailable {
            scopes: scopes.to_vec(),
        })?;

        if token.is_expired(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(token.clone())
    }
}
