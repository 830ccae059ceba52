//! Client for the transcriber backend API.

use reqwest::Client;
use tracing::{debug, info};

use crate::config::ConfigSource;
use crate::error::ApiError;
use crate::http::{check_status, ClientRegistry, NamedClient};

/// Name under which the backend client is registered.
pub const API_CLIENT_NAME: &str = "TranscriberApi";

/// Deployment placeholder used when `Api:BaseUrl` is absent.
pub const DEFAULT_API_BASE_URL: &str =
    "https://your-api-id.execute-api.us-east-1.amazonaws.com/prod/";

/// Backend API client. Requests carry no access token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: NamedClient,
}

impl ApiClient {
    pub fn new(client: NamedClient) -> Self {
        Self { client }
    }

    pub fn root_address(&self) -> &str {
        self.client.root_address()
    }

    /// Health check: `GET ping`, returning the response body.
    pub async fn ping(&self) -> Result<String, ApiError> {
        let request = self.client.get("ping")?;
        debug!("GET {}", request.url());

        let response = check_status(self.client.send(request).await?)?;
        response
            .text()
            .await
            .map_err(|e| ApiError::ParseFailed(e.to_string()))
    }
}

/// Register the backend client from `Api:BaseUrl`, normalized to one trailing slash.
pub fn register_api_client(
    registry: &mut ClientRegistry,
    config: &dyn ConfigSource,
    http: Client,
) -> ApiClient {
    let base_url = config
        .get("Api:BaseUrl")
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let root_address = format!("{}/", base_url.trim_end_matches('/'));

    let client = NamedClient::new(API_CLIENT_NAME, root_address, http);
    info!("Registered {} at {}", API_CLIENT_NAME, client.root_address());

    registry.register(client.clone());
    ApiClient::new(client)
}
