//! Microsoft Graph client registration and typed API calls.

pub mod client;
pub mod registration;

pub use client::{GraphClient, Organization, UserInfo, UserProfile};
pub use registration::{
    build_registration, register_graph_client, ClientRegistration, DEFAULT_GRAPH_BASE_URL,
    DEFAULT_GRAPH_SCOPES, GRAPH_CLIENT_NAME,
};
