//! Composition root: builds every client once and hands them out explicitly.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::api::{register_api_client, ApiClient};
use crate::auth::{AccessTokenProvider, AuthenticationOptions};
use crate::config::ConfigSource;
use crate::graph::{register_graph_client, ClientRegistration, GraphClient, GRAPH_CLIENT_NAME};
use crate::http::{build_http_client, ClientRegistry};

/// Everything the application needs to issue requests.
///
/// Built once at startup; no I/O happens until a client sends a request.
#[derive(Debug, Clone)]
pub struct AppServices {
    registry: ClientRegistry,
    graph_registration: ClientRegistration,
    api: ApiClient,
    auth: AuthenticationOptions,
}

impl AppServices {
    pub fn build(
        config: &dyn ConfigSource,
        provider: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let http = build_http_client()?;
        let mut registry = ClientRegistry::new();

        let api = register_api_client(&mut registry, config, http.clone());
        let graph_registration = register_graph_client(&mut registry, config, http, provider);

        let auth = AuthenticationOptions::bind(config);
        if let Err(e) = auth.validate() {
            warn!("{}", e);
        }

        info!(
            "Startup complete: {} clients registered",
            registry.names().count()
        );

        Ok(Self {
            registry,
            graph_registration,
            api,
            auth,
        })
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn graph_registration(&self) -> &ClientRegistration {
        &self.graph_registration
    }

    /// Typed Graph client over the registered `GraphAPI` named client.
    pub fn graph(&self) -> Option<GraphClient> {
        self.registry
            .get(GRAPH_CLIENT_NAME)
            .cloned()
            .map(GraphClient::new)
    }

    pub fn auth(&self) -> &AuthenticationOptions {
        &self.auth
    }
}
