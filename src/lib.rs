//! Media transcriber client bootstrap.
//!
//! Builds the backend API client and the Microsoft Graph client from configuration.
//! Requests through the Graph client carry a bearer token from an injected
//! [`auth::AccessTokenProvider`].

#![deny(clippy::all)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod graph;
pub mod http;
pub mod startup;

pub use config::{ConfigSource, LayeredConfig, MapConfig};
pub use error::{ApiError, AppError, ConfigError, TokenError};
pub use graph::{build_registration, ClientRegistration};
pub use startup::AppServices;
