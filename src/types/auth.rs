//! Authorization Types
//!
//! Pure data for the two token endpoint calls this flow makes. Both encoders
//! are deterministic functions of their fields; inputs are already-validated
//! tokens and identifiers, so encoding itself cannot fail.

use urlencoding::encode;

/// Refresh-token exchange request, PKCE variant.
///
/// PKCE refresh carries no client secret; the client proves itself with
/// `client_id` alone. The descriptor is constructed per call and never
/// persisted.
#[derive(Clone, Debug)]
pub struct RefreshRequest {
    pub refresh_token: String,
    pub client_id: String,
}

impl RefreshRequest {
    /// Form-encoded body:
    /// `grant_type=refresh_token&refresh_token=<t>&client_id=<id>`.
    pub fn form_body(&self) -> String {
        encode_pairs(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", &self.refresh_token),
            ("client_id", &self.client_id),
        ])
    }
}

/// Initial authorization-code exchange request, PKCE variant.
#[derive(Clone, Debug)]
pub struct CodeExchangeRequest {
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub code_verifier: String,
}

impl CodeExchangeRequest {
    /// Form-encoded body for `grant_type=authorization_code`.
    pub fn form_body(&self) -> String {
        encode_pairs(&[
            ("grant_type", "authorization_code"),
            ("code", &self.code),
            ("redirect_uri", &self.redirect_uri),
            ("client_id", &self.client_id),
            ("code_verifier", &self.code_verifier),
        ])
    }
}

/// Outbound authorization URL plus the state embedded in it.
#[derive(Clone, Debug)]
pub struct AuthorizeUrl {
    /// Full URL the user must be directed to.
    pub url: String,
    /// Anti-forgery state embedded in the URL; the redirect callback must
    /// echo it.
    pub state: String,
}

pub(crate) fn encode_pairs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_body_has_no_client_secret() {
        let request = RefreshRequest {
            refresh_token: "rt-abc".to_string(),
            client_id: "client-1".to_string(),
        };

        let body = request.form_body();
        assert_eq!(
            body,
            "grant_type=refresh_token&refresh_token=rt-abc&client_id=client-1"
        );
        assert!(!body.contains("client_secret"));
    }

    #[test]
    fn test_refresh_body_is_deterministic() {
        let request = RefreshRequest {
            refresh_token: "rt".to_string(),
            client_id: "id".to_string(),
        };
        assert_eq!(request.form_body(), request.form_body());
    }

    #[test]
    fn test_code_exchange_body() {
        let request = CodeExchangeRequest {
            code: "auth-code".to_string(),
            redirect_uri: "http://localhost:8080/callback".to_string(),
            client_id: "client-1".to_string(),
            code_verifier: "verifier-value".to_string(),
        };

        let body = request.form_body();
        assert!(body.starts_with("grant_type=authorization_code&code=auth-code"));
        assert!(body.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback"));
        assert!(body.contains("code_verifier=verifier-value"));
        assert!(!body.contains("client_secret"));
    }
}
