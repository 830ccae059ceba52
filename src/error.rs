//! Error types for the mediatranscriber client.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Client not registered: {0}")]
    ClientNotRegistered(String),
}

/// Configuration loading errors.
///
/// Missing keys are never errors; they resolve to defaults at the point of use.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse {layer}: {reason}")]
    Parse { layer: String, reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Access token errors raised by token providers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("No access token available for scopes [{}]", .scopes.join(" "))]
    NotAvailable { scopes: Vec<String> },

    #[error("Access token expired")]
    Expired,

    #[error("Token provider failed: {0}")]
    Provider(String),
}

/// Errors from requests issued through a named client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to attach access token: {0}")]
    Token(#[from] TokenError),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),

    #[error("Unauthorized (401): Token may be expired")]
    Unauthorized,

    #[error("Forbidden (403): Insufficient permissions")]
    Forbidden,

    #[error("Rate limited (429): Too many requests")]
    RateLimited,
}

impl ApiError {
    /// Returns true if the user has to sign in again before retrying.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Token(TokenError::NotAvailable { .. } | TokenError::Expired)
        )
    }
}

impl AppError {
    /// Returns a user-friendly message for display on the terminal.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Config(ConfigError::Parse { .. }) => "Configuration file is not valid TOML.",
            Self::Config(ConfigError::Read { .. }) => "Configuration file could not be read.",
            Self::Config(ConfigError::Invalid(_)) => "Configuration error. Please check settings.",
            Self::Api(ApiError::InvalidAddress { .. }) => {
                "Configured base URL is not a valid absolute URL."
            }
            Self::Api(ApiError::Unauthorized) => "Authentication expired. Sign in again.",
            Self::Api(ApiError::Forbidden) => "Insufficient permissions for this operation.",
            Self::Api(ApiError::RateLimited) => "Too many requests. Please wait a moment.",
            Self::Api(ApiError::Token(_)) => "No access token available for Microsoft Graph.",
            Self::Api(ApiError::RequestFailed(_)) => "Network error. Check your connection.",
            Self::ClientNotRegistered(_) => "Internal error: HTTP client not registered.",
            _ => "An error occurred. Please try again.",
        }
    }

    /// Returns true if this error should send the user back to sign-in.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, Self::Api(e) if e.requires_sign_in())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = AppError::Api(ApiError::Forbidden);
        assert_eq!(
            err.user_message(),
            "Insufficient permissions for this operation."
        );

        let err = AppError::Config(ConfigError::Invalid("client id".into()));
        assert_eq!(
            err.user_message(),
            "Configuration error. Please check settings."
        );
    }

    #[test]
    fn test_requires_sign_in() {
        let err = AppError::Api(ApiError::Unauthorized);
        assert!(err.requires_sign_in());

        let err = AppError::Api(ApiError::Token(TokenError::NotAvailable {
            scopes: vec!["user.read".into()],
        }));
        assert!(err.requires_sign_in());

        let err = AppError::Api(ApiError::RateLimited);
        assert!(!err.requires_sign_in());

        let err = AppError::ClientNotRegistered("GraphAPI".into());
        assert!(!err.requires_sign_in());
    }

    #[test]
    fn test_not_available_lists_scopes() {
        let err = TokenError::NotAvailable {
            scopes: vec!["a.read".into(), "b.write".into()],
        };
        assert_eq!(
            err.to_string(),
            "No access token available for scopes [a.read b.write]"
        );
    }
}
