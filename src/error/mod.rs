//! Error Types
//!
//! Closed taxonomy of local failures plus pass-through wrappers for
//! collaborator errors. Every variant captures the structured data its
//! message needs at construction time; nothing is re-derived from mutable
//! state later, and rendering is a pure function of the variant.

use std::time::Duration;

use thiserror::Error;

use crate::scope::ScopeSet;
use crate::types::id::IdCategory;

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type.
///
/// The first seven variants are the closed local taxonomy; local failures
/// are detected before any network round-trip is spent. The remaining
/// variants carry collaborator errors through unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// An operation requiring a credential was attempted with none present.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Redirect-callback state did not match the pending authorization
    /// state, or no authorization was pending.
    #[error(
        "authorization state mismatch (supplied: {}, received: {})",
        display_or_absent(.supplied),
        display_or_absent(.received)
    )]
    InvalidState {
        /// The state issued when authorization began, if any was pending.
        supplied: Option<String>,
        /// The state the redirect callback carried, if any.
        received: Option<String>,
    },

    /// A resource identifier string could not be decoded.
    #[error("identifier parsing error: {message}")]
    IdentifierParsing { message: String },

    /// An endpoint's scope requirement is not covered by the granted scopes.
    #[error("insufficient scope: requires [{required}], authorized for [{authorized}]")]
    InsufficientScope {
        required: ScopeSet,
        authorized: ScopeSet,
    },

    /// A well-formed identifier resolved to a category the caller does not
    /// accept.
    #[error(
        "invalid URI type: expected one of [{}], received {received}",
        join_categories(.expected)
    )]
    InvalidUriType {
        expected: Vec<IdCategory>,
        received: IdCategory,
    },

    /// A response envelope was expected to wrap its payload under `key` but
    /// did not. The captured payload is bounded; see
    /// [`crate::types::envelope`].
    #[error("top-level key `{key}` not found in payload: {payload}")]
    TopLevelKeyNotFound { key: String, payload: String },

    /// Escape hatch for conditions not otherwise modeled.
    #[error("{message}")]
    Other { message: String },

    /// Network-level failure from the HTTP transport, unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error response from the authorization server, unchanged beyond the
    /// RFC 6749 §5.2 mapping.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Failure from the credential persistence sink, unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Short stable code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "AUTH_UNAUTHORIZED",
            Self::InvalidState { .. } => "AUTH_INVALID_STATE",
            Self::IdentifierParsing { .. } => "AUTH_ID_PARSING",
            Self::InsufficientScope { .. } => "AUTH_INSUFFICIENT_SCOPE",
            Self::InvalidUriType { .. } => "AUTH_INVALID_URI_TYPE",
            Self::TopLevelKeyNotFound { .. } => "AUTH_KEY_NOT_FOUND",
            Self::Other { .. } => "AUTH_OTHER",
            Self::Transport(_) => "AUTH_TRANSPORT",
            Self::Provider(_) => "AUTH_PROVIDER",
            Self::Store(_) => "AUTH_STORE",
        }
    }

    /// Whether the failure was detected locally, without a network call.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Transport(_) | Self::Provider(_) | Self::Store(_))
    }

    /// Whether the caller must restart authorization from the user grant.
    pub fn needs_reauthorization(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::InvalidState { .. }
                | Self::Provider(ProviderError::InvalidGrant { .. })
        )
    }
}

fn display_or_absent(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<absent>")
}

fn join_categories(categories: &[IdCategory]) -> String {
    categories
        .iter()
        .map(IdCategory::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Network/transport failure.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("unexpected redirect to {location}")]
    UnexpectedRedirect { location: String },

    #[error("response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

/// Authorization-server error, mapped from an RFC 6749 §5.2 error response.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("invalid client credentials")]
    InvalidClient { description: Option<String> },

    #[error("invalid grant: {message}")]
    InvalidGrant { message: String },

    #[error("client not authorized for this grant type")]
    UnauthorizedClient { description: Option<String> },

    #[error("unsupported grant type: {grant_type}")]
    UnsupportedGrantType { grant_type: String },

    #[error("invalid scope: {scope}")]
    InvalidScope { scope: String },

    #[error("server error: {message}")]
    ServerError { message: String },
}

/// Credential persistence failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("read failed: {message}")]
    ReadFailed { message: String },

    #[error("write failed: {message}")]
    WriteFailed { message: String },

    #[error("corrupted snapshot: {message}")]
    Corrupted { message: String },
}

/// OAuth2 error response body from the authorization server.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Map a parsed error response to the provider error taxonomy.
pub fn map_error_response(response: &ErrorResponse) -> ProviderError {
    let description = || {
        response
            .error_description
            .clone()
            .unwrap_or_else(|| response.error.clone())
    };

    match response.error.as_str() {
        "invalid_client" => ProviderError::InvalidClient {
            description: response.error_description.clone(),
        },
        "invalid_grant" => ProviderError::InvalidGrant {
            message: description(),
        },
        "invalid_scope" => ProviderError::InvalidScope {
            scope: description(),
        },
        "unauthorized_client" => ProviderError::UnauthorizedClient {
            description: response.error_description.clone(),
        },
        "unsupported_grant_type" => ProviderError::UnsupportedGrantType {
            grant_type: description(),
        },
        "server_error" => ProviderError::ServerError {
            message: description(),
        },
        _ => ProviderError::InvalidRequest {
            message: description(),
        },
    }
}

/// Build an error from a non-200 token endpoint response.
///
/// Prefers the JSON error body when one is present; falls back to mapping
/// the HTTP status.
pub fn status_error(status: u16, body: &str) -> Error {
    if let Ok(response) = serde_json::from_str::<ErrorResponse>(body) {
        return Error::Provider(map_error_response(&response));
    }

    let error = match status {
        400 => ProviderError::InvalidRequest {
            message: "bad request".to_string(),
        },
        401 => ProviderError::InvalidClient { description: None },
        403 => ProviderError::UnauthorizedClient { description: None },
        _ => ProviderError::ServerError {
            message: format!("HTTP {status}"),
        },
    };

    Error::Provider(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_message_with_absent_sides() {
        let err = Error::InvalidState {
            supplied: None,
            received: Some("abc".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("supplied: <absent>"), "{message}");
        assert!(message.contains("received: abc"), "{message}");
    }

    #[test]
    fn test_insufficient_scope_message() {
        let err = Error::InsufficientScope {
            required: ["playlist-read"].into_iter().collect(),
            authorized: ["playlist-modify"].into_iter().collect(),
        };
        let message = err.to_string();
        assert!(message.contains("requires [playlist-read]"), "{message}");
        assert!(
            message.contains("authorized for [playlist-modify]"),
            "{message}"
        );
    }

    #[test]
    fn test_invalid_uri_type_message() {
        let err = Error::InvalidUriType {
            expected: vec![IdCategory::Track, IdCategory::Artist],
            received: IdCategory::Album,
        };
        let message = err.to_string();
        assert!(message.contains("track, artist"), "{message}");
        assert!(message.contains("received album"), "{message}");
    }

    #[test]
    fn test_is_local() {
        assert!(Error::Other {
            message: "x".to_string()
        }
        .is_local());
        assert!(!Error::Transport(TransportError::ConnectionFailed {
            message: "refused".to_string()
        })
        .is_local());
    }

    #[test]
    fn test_map_error_response() {
        let response = ErrorResponse {
            error: "invalid_grant".to_string(),
            error_description: Some("refresh token revoked".to_string()),
        };
        match map_error_response(&response) {
            ProviderError::InvalidGrant { message } => {
                assert_eq!(message, "refresh token revoked")
            }
            other => panic!("unexpected mapping: {other}"),
        }
    }

    #[test]
    fn test_status_error_prefers_body() {
        let err = status_error(400, r#"{"error":"invalid_client"}"#);
        assert!(matches!(
            err,
            Error::Provider(ProviderError::InvalidClient { .. })
        ));

        let err = status_error(503, "gateway exploded");
        assert!(matches!(
            err,
            Error::Provider(ProviderError::ServerError { .. })
        ));
    }

    #[test]
    fn test_needs_reauthorization() {
        assert!(Error::Unauthorized {
            message: "no credential".to_string()
        }
        .needs_reauthorization());
        assert!(!Error::Other {
            message: "x".to_string()
        }
        .needs_reauthorization());
    }
}
