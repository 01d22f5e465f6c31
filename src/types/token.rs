//! Token Types
//!
//! The credential held by the lifecycle manager and the token endpoint's
//! response shape.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::scope::ScopeSet;

/// Successful response from the token endpoint.
///
/// `expires_in` is required: the credential's expiration instant is always
/// derived from the grant instant plus the server-reported lifetime, never
/// guessed.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (always "Bearer" for this flow).
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// Rotated refresh token. PKCE refresh responses always carry one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes, space-separated. Absent means "unchanged".
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The credential owned by the lifecycle manager.
///
/// Token material is held as [`SecretString`] so it never leaks through
/// `Debug` or logs. Mutation happens only through the refresh protocol, by
/// wholesale replacement.
#[derive(Clone)]
pub struct Credential {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    /// Instant at which the access token stops being valid.
    pub expires_at: DateTime<Utc>,
    /// Scopes the user granted.
    pub scopes: ScopeSet,
}

impl Credential {
    /// Build a credential from a token response received at `granted_at`.
    ///
    /// `fallback_scopes` is used when the response omits the `scope` field
    /// (the server reporting no change).
    pub fn from_response(
        response: &TokenResponse,
        granted_at: DateTime<Utc>,
        fallback_scopes: &ScopeSet,
    ) -> Self {
        let scopes = response
            .scope
            .as_deref()
            .map(ScopeSet::from_wire)
            .unwrap_or_else(|| fallback_scopes.clone());

        // Saturate rather than trust the endpoint: a pathological
        // `expires_in` must not panic the date arithmetic.
        let expires_at = i64::try_from(response.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| granted_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            access_token: SecretString::new(response.access_token.clone()),
            refresh_token: response
                .refresh_token
                .clone()
                .map(SecretString::new),
            expires_at,
            scopes,
        }
    }

    /// The raw access token, for an `Authorization: Bearer` header.
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// The refresh token, absent only before the first grant.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|t| t.expose_secret().as_str())
    }

    /// Whether the token expires within `margin` from now.
    pub fn is_expired(&self, margin: Duration) -> bool {
        self.expires_at <= Utc::now() + margin
    }

    /// Serializable image for the persistence sink.
    pub fn snapshot(&self) -> CredentialSnapshot {
        CredentialSnapshot {
            access_token: self.access_token.expose_secret().clone(),
            refresh_token: self
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().clone()),
            expires_at: self.expires_at,
            scopes: self.scopes.clone(),
        }
    }

    /// Restore from a previously saved snapshot.
    pub fn from_snapshot(snapshot: CredentialSnapshot) -> Self {
        Self {
            access_token: SecretString::new(snapshot.access_token),
            refresh_token: snapshot.refresh_token.map(SecretString::new),
            expires_at: snapshot.expires_at,
            scopes: snapshot.scopes,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Opaque serialized form of [`Credential`] exchanged with the persistence
/// sink. The sink treats it as a blob; this crate does not dictate how it is
/// stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialSnapshot {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub scopes: ScopeSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> TokenResponse {
        serde_json::from_str(
            r#"{
                "access_token": "at-1",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "rt-1",
                "scope": "playlist-read user-read-email"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_token_response_parsing() {
        let parsed = response();
        assert_eq!(parsed.access_token, "at-1");
        assert_eq!(parsed.expires_in, 3600);
        assert_eq!(parsed.refresh_token.as_deref(), Some("rt-1"));
    }

    #[test]
    fn test_token_response_requires_expires_in() {
        let result: Result<TokenResponse, _> =
            serde_json::from_str(r#"{"access_token": "at-1", "token_type": "Bearer"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_expiration_derived_from_grant_instant() {
        let granted_at = Utc::now();
        let credential =
            Credential::from_response(&response(), granted_at, &ScopeSet::new());
        assert_eq!(credential.expires_at, granted_at + Duration::seconds(3600));

        assert!(!credential.is_expired(Duration::seconds(60)));
        assert!(credential.is_expired(Duration::seconds(3700)));
    }

    #[test]
    fn test_pathological_expires_in_saturates() {
        let mut resp = response();
        resp.expires_in = u64::MAX;

        let credential = Credential::from_response(&resp, Utc::now(), &ScopeSet::new());
        assert_eq!(credential.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!credential.is_expired(Duration::seconds(60)));

        // Just past the chrono Duration range, but still inside i64 seconds.
        resp.expires_in = i64::MAX as u64;
        let credential = Credential::from_response(&resp, Utc::now(), &ScopeSet::new());
        assert_eq!(credential.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_fallback_scopes_when_response_omits_scope() {
        let mut resp = response();
        resp.scope = None;
        let granted: ScopeSet = ["playlist-read"].into_iter().collect();

        let credential = Credential::from_response(&resp, Utc::now(), &granted);
        assert_eq!(credential.scopes, granted);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let credential =
            Credential::from_response(&response(), Utc::now(), &ScopeSet::new());

        let json = serde_json::to_string(&credential.snapshot()).unwrap();
        let restored =
            Credential::from_snapshot(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.access_token(), "at-1");
        assert_eq!(restored.refresh_token(), Some("rt-1"));
        assert_eq!(restored.expires_at, credential.expires_at);
        assert_eq!(restored.scopes, credential.scopes);
    }

    #[test]
    fn test_debug_redacts_token_material() {
        let credential =
            Credential::from_response(&response(), Utc::now(), &ScopeSet::new());
        let debug = format!("{credential:?}");
        assert!(!debug.contains("at-1"));
        assert!(!debug.contains("rt-1"));
        assert!(debug.contains("[REDACTED]"));
    }
}
