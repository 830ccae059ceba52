//! Request handler that attaches bearer tokens for authorized URLs.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::token::AccessTokenProvider;
use crate::error::TokenError;

/// Attaches `Authorization: Bearer` headers to requests whose URL falls under
/// one of the authorized base URLs.
///
/// Immutable once built; share it through `Arc` across concurrent requests.
pub struct AuthorizationHandler {
    authorized_urls: Vec<String>,
    scopes: Vec<String>,
    provider: Arc<dyn AccessTokenProvider>,
}

impl AuthorizationHandler {
    pub fn new(
        provider: Arc<dyn AccessTokenProvider>,
        authorized_urls: Vec<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            authorized_urls,
            scopes,
            provider,
        }
    }

    pub fn authorized_urls(&self) -> &[String] {
        &self.authorized_urls
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Check whether `url` lies under any authorized base URL.
    ///
    /// Scheme, host and port must match, and the path must equal the base path or
    /// continue it at a segment boundary.
    pub fn is_authorized(&self, url: &Url) -> bool {
        self.authorized_urls
            .iter()
            .filter_map(|base| Url::parse(base).ok())
            .any(|base| is_base_of(&base, url))
    }

    /// Attach a token to `request` if its URL is authorized.
    ///
    /// Requests to other URLs pass through untouched.
    pub async fn attach(&self, request: &mut reqwest::Request) -> Result<(), TokenError> {
        if !self.is_authorized(request.url()) {
            debug!(
                "Not attaching token to {}: outside authorized URLs",
                request.url()
            );
            return Ok(());
        }

        let token = self.provider.access_token(&self.scopes).await?;
        let header = Zeroizing::new(format!("Bearer {}", token.secret()));
        let mut value = HeaderValue::from_str(&header)
            .map_err(|_| TokenError::Provider("token contains invalid header characters".into()))?;
        value.set_sensitive(true);

        request.headers_mut().insert(AUTHORIZATION, value);
        debug!("Attached access token to {}", request.url());
        Ok(())
    }
}

impl std::fmt::Debug for AuthorizationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationHandler")
            .field("authorized_urls", &self.authorized_urls)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

fn is_base_of(base: &Url, url: &Url) -> bool {
    if base.scheme() != url.scheme()
        || base.host_str() != url.host_str()
        || base.port_or_known_default() != url.port_or_known_default()
    {
        return false;
    }

    let base_path = base.path().trim_end_matches('/');
    let path = url.path();

    base_path.is_empty()
        || path == base_path
        || path
            .strip_prefix(base_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{AccessToken, StaticTokenProvider};

    fn handler(provider: StaticTokenProvider, base: &str) -> AuthorizationHandler {
        AuthorizationHandler::new(
            Arc::new(provider),
            vec![base.to_string()],
            vec!["user.read".to_string()],
        )
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_is_authorized_paths() {
        let h = handler(StaticTokenProvider::empty(), "https://graph.microsoft.com/v1.0");

        assert!(h.is_authorized(&url("https://graph.microsoft.com/v1.0")));
        assert!(h.is_authorized(&url("https://graph.microsoft.com/v1.0/")));
        assert!(h.is_authorized(&url("https://graph.microsoft.com/v1.0/me?$select=id")));
        assert!(!h.is_authorized(&url("https://graph.microsoft.com/v1.0x/me")));
        assert!(!h.is_authorized(&url("https://graph.microsoft.com/beta/me")));
    }

    #[test]
    fn test_is_authorized_origin() {
        let h = handler(StaticTokenProvider::empty(), "https://graph.microsoft.com/v1.0");

        assert!(!h.is_authorized(&url("http://graph.microsoft.com/v1.0/me")));
        assert!(!h.is_authorized(&url("https://graph.microsoft.com:8443/v1.0/me")));
        assert!(!h.is_authorized(&url("https://evil.example.com/v1.0/me")));
        assert!(h.is_authorized(&url("https://graph.microsoft.com:443/v1.0/me")));
    }

    #[test]
    fn test_root_base_authorizes_whole_origin() {
        let h = handler(StaticTokenProvider::empty(), "https://graph.example.com");
        assert!(h.is_authorized(&url("https://graph.example.com/anything/here")));
    }

    #[test]
    fn test_unparsable_base_matches_nothing() {
        let h = handler(StaticTokenProvider::empty(), "");
        assert!(!h.is_authorized(&url("https://graph.microsoft.com/v1.0/me")));
    }

    #[tokio::test]
    async fn test_attach_sets_bearer_header() {
        let h = handler(
            StaticTokenProvider::new(AccessToken::new("abc123")),
            "https://graph.microsoft.com/v1.0",
        );
        let mut request = reqwest::Request::new(
            reqwest::Method::GET,
            url("https://graph.microsoft.com/v1.0/me"),
        );

        h.attach(&mut request).await.unwrap();

        let value = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc123");
        assert!(value.is_sensitive());
    }

    #[tokio::test]
    async fn test_attach_skips_other_hosts() {
        // An empty provider would fail if it were asked for a token
        let h = handler(StaticTokenProvider::empty(), "https://graph.microsoft.com/v1.0");
        let mut request =
            reqwest::Request::new(reqwest::Method::GET, url("https://api.example.com/ping"));

        h.attach(&mut request).await.unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_attach_propagates_missing_token() {
        let h = handler(StaticTokenProvider::empty(), "https://graph.microsoft.com/v1.0");
        let mut request = reqwest::Request::new(
            reqwest::Method::GET,
            url("https://graph.microsoft.com/v1.0/me"),
        );

        let err = h.attach(&mut request).await.unwrap_err();
        assert_eq!(
            err,
            TokenError::NotAvailable {
                scopes: vec!["user.read".to_string()]
            }
        );
    }
}
