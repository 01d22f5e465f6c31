//! Data Types
//!
//! Credential, request, identifier, and configuration types.

pub mod auth;
pub mod config;
pub mod envelope;
pub mod id;
pub mod token;

pub use auth::{AuthorizeUrl, CodeExchangeRequest, RefreshRequest};
pub use config::{
    Config, DEFAULT_AUTHORIZE_ENDPOINT, DEFAULT_REFRESH_MARGIN_SECS, DEFAULT_TOKEN_ENDPOINT,
};
pub use envelope::{top_level_key, ENVELOPE_CAPTURE_MAX};
pub use id::{IdCategory, SpotifyId};
pub use token::{Credential, CredentialSnapshot, TokenResponse};
