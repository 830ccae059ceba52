//! Bearer token attachment for outgoing requests.
//!
//! Tokens come from an injected [`AccessTokenProvider`]; this module never acquires
//! or refreshes tokens itself. The [`AuthorizationHandler`] decides which requests
//! get a token and which scopes are asked for.

pub mod handler;
pub mod options;
pub mod token;

pub use handler::AuthorizationHandler;
pub use options::AuthenticationOptions;
pub use token::{AccessToken, AccessTokenProvider, StaticTokenProvider};
