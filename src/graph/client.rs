//! Typed Microsoft Graph calls over the `GraphAPI` named client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::http::{check_status, NamedClient};

/// Microsoft Graph API client.
///
/// Paths are relative to the registration's root address, so `me` resolves to
/// `<base_url>/me`.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: NamedClient,
}

impl GraphClient {
    pub fn new(client: NamedClient) -> Self {
        Self { client }
    }

    /// Fetch the current user's profile.
    pub async fn get_user_profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json("me").await
    }

    /// Fetch the user's organization info.
    pub async fn get_organization(&self) -> Result<Organization, ApiError> {
        let org_response: OrganizationResponse = self.get_json("organization").await?;

        org_response
            .value
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::ParseFailed("No organization found".to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.get(path)?;
        debug!("GET {}", request.url());

        let response = check_status(self.client.send(request).await?)?;
        response
            .json()
            .await
            .map_err(|e| ApiError::ParseFailed(e.to_string()))
    }
}

/// The signed-in user as returned by `GET me`.
///
/// Graph omits unset properties, so everything past `id` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
}

impl UserProfile {
    /// Display name, else the UPN.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.user_principal_name.as_deref())
            .unwrap_or("(unnamed user)")
    }

    /// Mailbox address, else the UPN.
    pub fn contact(&self) -> &str {
        self.mail
            .as_deref()
            .or(self.user_principal_name.as_deref())
            .unwrap_or("(no address)")
    }
}

#[derive(Debug, Deserialize)]
struct OrganizationResponse {
    value: Vec<Organization>,
}

/// The user's tenant as returned by `GET organization`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub display_name: Option<String>,
}

impl Organization {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// What `mediatranscriber me` prints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub user: String,
    pub contact: String,
    pub tenant: String,
    pub tenant_id: String,
}

impl UserInfo {
    pub fn new(profile: &UserProfile, org: &Organization) -> Self {
        Self {
            user: profile.label().to_string(),
            contact: profile.contact().to_string(),
            tenant: org.label().to_string(),
            tenant_id: org.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, AuthorizationHandler, StaticTokenProvider};
    use crate::http::build_http_client;
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn graph_for(server: &MockServer) -> GraphClient {
        let base = format!("{}/v1.0", server.uri());
        let handler = AuthorizationHandler::new(
            Arc::new(StaticTokenProvider::new(AccessToken::new("graph-token"))),
            vec![base.clone()],
            vec!["user.read".into()],
        );
        let client = NamedClient::new("GraphAPI", format!("{}/", base), build_http_client().unwrap())
            .with_handler(handler);
        GraphClient::new(client)
    }

    #[test]
    fn test_labels_fall_back_to_upn() {
        let profile = UserProfile {
            id: "123".into(),
            display_name: None,
            mail: None,
            user_principal_name: Some("user@tenant.com".into()),
        };
        let org = Organization {
            id: "tenant-1".into(),
            display_name: None,
        };

        assert_eq!(
            UserInfo::new(&profile, &org),
            UserInfo {
                user: "user@tenant.com".into(),
                contact: "user@tenant.com".into(),
                tenant: "tenant-1".into(),
                tenant_id: "tenant-1".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_get_user_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .and(header("authorization", "Bearer graph-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "123",
                "displayName": "John Doe",
                "mail": "john@example.com",
                "userPrincipalName": "john@example.com"
            })))
            .mount(&server)
            .await;

        let profile = graph_for(&server).get_user_profile().await.unwrap();
        assert_eq!(profile.label(), "John Doe");
        assert_eq!(profile.contact(), "john@example.com");
    }

    #[tokio::test]
    async fn test_get_organization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/organization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{ "id": "tenant-1", "displayName": "Contoso" }]
            })))
            .mount(&server)
            .await;

        let org = graph_for(&server).get_organization().await.unwrap();
        assert_eq!(org.label(), "Contoso");
    }

    #[tokio::test]
    async fn test_empty_organization_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/organization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })))
            .mount(&server)
            .await;

        let err = graph_for(&server).get_organization().await.unwrap_err();
        assert!(matches!(err, ApiError::ParseFailed(_)));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1.0/organization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let graph = graph_for(&server);
        assert!(matches!(
            graph.get_user_profile().await,
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            graph.get_organization().await,
            Err(ApiError::RequestFailed(ref msg)) if msg == "HTTP 500"
        ));
    }
}
