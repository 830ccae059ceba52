//! Builds the `GraphAPI` named client from configuration.

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::auth::{AccessTokenProvider, AuthorizationHandler};
use crate::config::ConfigSource;
use crate::http::{ClientRegistry, NamedClient};

/// Name under which the Graph client is registered.
pub const GRAPH_CLIENT_NAME: &str = "GraphAPI";

/// Base URL used when `MicrosoftGraph:BaseUrl` is absent.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Scopes string used when `MicrosoftGraph:Scopes` is absent.
pub const DEFAULT_GRAPH_SCOPES: &str = "user.read";

const BASE_URL_KEY: &str = "MicrosoftGraph:BaseUrl";
const SCOPES_KEY: &str = "MicrosoftGraph:Scopes";

/// A named client bound to a base URL and the scopes requested for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRegistration {
    pub name: String,
    /// Never ends with `/`.
    pub base_url: String,
    /// Never empty.
    pub scopes: Vec<String>,
}

impl ClientRegistration {
    /// The client's root address: the base URL with exactly one trailing slash.
    pub fn root_address(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// URLs the token handler may attach a token for.
    pub fn authorized_urls(&self) -> Vec<String> {
        vec![self.base_url.clone()]
    }
}

/// Read the Graph registration from `config`.
///
/// Missing keys fall back to defaults. Nothing is validated and no I/O happens;
/// a malformed base URL surfaces when the first request is built.
pub fn build_registration(config: &dyn ConfigSource) -> ClientRegistration {
    let base_url = config
        .get(BASE_URL_KEY)
        .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let scopes_config = config
        .get(SCOPES_KEY)
        .unwrap_or_else(|| DEFAULT_GRAPH_SCOPES.to_string());

    let mut scopes = split_scopes(&scopes_config);
    if scopes.is_empty() {
        warn!(
            "{} is set but contains no scopes, using '{}'",
            SCOPES_KEY, DEFAULT_GRAPH_SCOPES
        );
        scopes = split_scopes(DEFAULT_GRAPH_SCOPES);
    }

    ClientRegistration {
        name: GRAPH_CLIENT_NAME.to_string(),
        base_url,
        scopes,
    }
}

fn split_scopes(value: &str) -> Vec<String> {
    value
        .split(' ')
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the Graph registration and register its client with a token handler.
pub fn register_graph_client(
    registry: &mut ClientRegistry,
    config: &dyn ConfigSource,
    http: Client,
    provider: Arc<dyn AccessTokenProvider>,
) -> ClientRegistration {
    let registration = build_registration(config);

    let handler = AuthorizationHandler::new(
        provider,
        registration.authorized_urls(),
        registration.scopes.clone(),
    );
    let client = NamedClient::new(&registration.name, registration.root_address(), http)
        .with_handler(handler);

    info!(
        "Registered {} at {} with scopes [{}]",
        registration.name,
        client.root_address(),
        registration.scopes.join(" ")
    );

    registry.register(client);
    registration
}
