//! Configuration Types

use std::time::Duration;

use crate::scope::ScopeSet;

/// Spotify accounts service authorization endpoint.
pub const DEFAULT_AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
/// Spotify accounts service token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Default refresh safety margin: a token expiring within this window is
/// refreshed before being handed out.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

/// Client configuration for the authorization code + PKCE flow.
///
/// A public (PKCE) client carries no client secret by design.
#[derive(Clone, Debug)]
pub struct Config {
    /// Application client identifier.
    pub client_id: String,
    /// Authorization endpoint the user is redirected to.
    pub authorize_endpoint: String,
    /// Token endpoint for code exchange and refresh.
    pub token_endpoint: String,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
    /// Scopes requested at authorization time.
    pub scopes: ScopeSet,
    /// HTTP timeout for token endpoint calls.
    pub timeout: Duration,
    /// Refresh safety margin in seconds.
    pub refresh_margin_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            authorize_endpoint: DEFAULT_AUTHORIZE_ENDPOINT.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            redirect_uri: String::new(),
            scopes: ScopeSet::new(),
            timeout: Duration::from_secs(30),
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_spotify_accounts() {
        let config = Config::default();
        assert_eq!(config.authorize_endpoint, DEFAULT_AUTHORIZE_ENDPOINT);
        assert_eq!(config.token_endpoint, DEFAULT_TOKEN_ENDPOINT);
        assert_eq!(config.refresh_margin_secs, 60);
    }
}
