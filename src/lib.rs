//! Spotify OAuth2 Credential Lifecycle
//!
//! OAuth 2.0 Authorization Code Flow with PKCE (RFC 7636) for public
//! clients of the Spotify accounts service, centered on correct token
//! lifecycle management:
//!
//! - anti-forgery state validation on the redirect handshake, with the
//!   pending state consumed on first use
//! - automatic refresh with a safety margin, serialized so concurrent
//!   callers collapse into a single network refresh
//! - single-use refresh-token rotation, enforced as the protocol requires
//! - scope enforcement and resource-identifier validation before a request
//!   ever reaches the network
//! - a closed error taxonomy whose variants carry the structured data their
//!   messages are rendered from
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spotify_auth::{config, ReqwestTransport, TokenManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = config()
//!         .client_id("application client id")
//!         .redirect_uri("http://localhost:8080/callback")
//!         .scope("playlist-read-private")
//!         .build()?;
//!
//!     let transport = Arc::new(ReqwestTransport::new()?);
//!     let manager = TokenManager::new(config, transport);
//!
//!     // Direct the user to `authorize.url`; the callback echoes the state.
//!     let authorize = manager.begin_authorization();
//!     println!("visit: {}", authorize.url);
//!
//!     // From the redirect callback query parameters:
//!     let (code, state) = ("...", "...");
//!     manager.complete_authorization(code, Some(state)).await?;
//!
//!     // From here on, every API call starts with a valid token.
//!     let token = manager.access_token().await?;
//!     println!("bearer {token}");
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `scope`: scope set value type
//! - `error`: closed local error taxonomy plus collaborator pass-through
//! - `types`: credential, token endpoint payloads, identifiers, config
//! - `core`: HTTP transport seam, PKCE primitives, authorization handshake
//! - `token`: the lifecycle manager and credential persistence seam
//! - `builders`: fluent configuration builder

pub mod builders;
pub mod core;
pub mod error;
pub mod scope;
pub mod token;
pub mod types;

// Re-export the lifecycle surface
pub use token::{CredentialStore, InMemoryCredentialStore, MockCredentialStore, TokenManager};

// Re-export builders
pub use builders::{config, ConfigBuilder, ConfigError};

// Re-export errors
pub use error::{
    map_error_response, status_error, Error, ErrorResponse, ProviderError, Result, StoreError,
    TransportError,
};

// Re-export types
pub use scope::ScopeSet;
pub use types::{
    top_level_key, AuthorizeUrl, CodeExchangeRequest, Config, Credential, CredentialSnapshot,
    IdCategory, RefreshRequest, SpotifyId, TokenResponse,
};

// Re-export core components
pub use crate::core::{
    AuthorizationHandshake, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockTransport,
    PendingAuthorization, ReqwestTransport,
};
