//! Interactive sign-in options bound from the `AzureAd` section.

use crate::config::ConfigSource;
use crate::error::ConfigError;

/// Scope always requested at sign-in so the Graph client can read the profile.
pub const GRAPH_USER_READ_SCOPE: &str = "https://graph.microsoft.com/User.Read";

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";
const CLIENT_ID_PLACEHOLDER: &str = "YOUR_AZURE_AD_CLIENT_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationOptions {
    pub authority: String,
    pub client_id: String,
    pub validate_authority: bool,
    pub default_access_token_scopes: Vec<String>,
}

impl AuthenticationOptions {
    /// Bind `AzureAd:Authority`, `AzureAd:ClientId` and `AzureAd:ValidateAuthority`.
    pub fn bind(config: &dyn ConfigSource) -> Self {
        let validate_authority = config
            .get("AzureAd:ValidateAuthority")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Self {
            authority: config
                .get("AzureAd:Authority")
                .unwrap_or_else(|| DEFAULT_AUTHORITY.to_string()),
            client_id: config.get("AzureAd:ClientId").unwrap_or_default(),
            validate_authority,
            default_access_token_scopes: vec![GRAPH_USER_READ_SCOPE.to_string()],
        }
    }

    /// Check that a real client id is configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() || self.client_id == CLIENT_ID_PLACEHOLDER {
            return Err(ConfigError::Invalid(
                "Azure AD client id not configured. Set AZURE_CLIENT_ID environment variable \
                 or AzureAd:ClientId in appsettings.toml"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Authorization endpoint under the configured authority.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/oauth2/v2.0/authorize",
            self.authority.trim_end_matches('/')
        )
    }
}
