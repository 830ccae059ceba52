//! Named HTTP clients and the explicit client registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, Request, Response};
use url::Url;

use crate::auth::AuthorizationHandler;
use crate::error::ApiError;

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the connection pool shared by all named clients.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// An HTTP client bound to a root address, with an optional token handler.
///
/// Cloning is cheap; clones share the connection pool and the handler.
#[derive(Debug, Clone)]
pub struct NamedClient {
    name: String,
    root_address: String,
    handler: Option<Arc<AuthorizationHandler>>,
    http: Client,
}

impl NamedClient {
    /// The root address is not validated here; a malformed one fails on first use.
    pub fn new(name: impl Into<String>, root_address: impl Into<String>, http: Client) -> Self {
        Self {
            name: name.into(),
            root_address: root_address.into(),
            handler: None,
            http,
        }
    }

    pub fn with_handler(mut self, handler: AuthorizationHandler) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_address(&self) -> &str {
        &self.root_address
    }

    pub fn handler(&self) -> Option<&AuthorizationHandler> {
        self.handler.as_deref()
    }

    /// Resolve `path` against the root address.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let invalid = |e: url::ParseError| ApiError::InvalidAddress {
            address: self.root_address.clone(),
            reason: e.to_string(),
        };

        Url::parse(&self.root_address)
            .map_err(invalid)?
            .join(path)
            .map_err(invalid)
    }

    /// Build a request for `path` relative to the root address.
    pub fn request(&self, method: Method, path: &str) -> Result<Request, ApiError> {
        Ok(Request::new(method, self.url(path)?))
    }

    pub fn get(&self, path: &str) -> Result<Request, ApiError> {
        self.request(Method::GET, path)
    }

    /// Run the token handler, then send.
    pub async fn send(&self, mut request: Request) -> Result<Response, ApiError> {
        if let Some(handler) = &self.handler {
            handler.attach(&mut request).await?;
        }

        self.http
            .execute(request)
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))
    }
}

/// Named clients built at startup, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, NamedClient>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` under its name, replacing any previous entry.
    pub fn register(&mut self, client: NamedClient) {
        self.clients.insert(client.name().to_string(), client);
    }

    pub fn get(&self, name: &str) -> Option<&NamedClient> {
        self.clients.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }
}

/// Map a non-success status to an API error, as Graph and the backend both answer.
pub(crate) fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 => Err(ApiError::Unauthorized),
        403 => Err(ApiError::Forbidden),
        429 => Err(ApiError::RateLimited),
        // Don't expose raw API error details - just the status code
        code => Err(ApiError::RequestFailed(format!("HTTP {}", code))),
    }
}
