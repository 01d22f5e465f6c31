//! Configuration Builder
//!
//! Fluent builder for the client configuration.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::scope::ScopeSet;
use crate::types::{Config, DEFAULT_AUTHORIZE_ENDPOINT, DEFAULT_REFRESH_MARGIN_SECS, DEFAULT_TOKEN_ENDPOINT};

/// Configuration validation failure. Raised at build time, before any
/// lifecycle operation runs; distinct from the runtime error taxonomy.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid endpoint URL `{url}`: {message}")]
    InvalidEndpoint { url: String, message: String },
}

/// Builder for [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    client_id: Option<String>,
    authorize_endpoint: Option<String>,
    token_endpoint: Option<String>,
    redirect_uri: Option<String>,
    scopes: ScopeSet,
    timeout: Option<Duration>,
    refresh_margin_secs: Option<i64>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application client identifier.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Override the authorization endpoint.
    pub fn authorize_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorize_endpoint = Some(endpoint.into());
        self
    }

    /// Override the token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Set the registered redirect URI.
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Add a scope to request at authorization time.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.insert(scope);
        self
    }

    /// Set all requested scopes at once.
    pub fn scopes(mut self, scopes: ScopeSet) -> Self {
        self.scopes = scopes;
        self
    }

    /// Set the HTTP timeout for token endpoint calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the refresh safety margin in seconds.
    pub fn refresh_margin_secs(mut self, secs: i64) -> Self {
        self.refresh_margin_secs = Some(secs);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let client_id = self
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingField { field: "client_id" })?;

        let redirect_uri = self
            .redirect_uri
            .ok_or(ConfigError::MissingField {
                field: "redirect_uri",
            })?;

        let authorize_endpoint = self
            .authorize_endpoint
            .unwrap_or_else(|| DEFAULT_AUTHORIZE_ENDPOINT.to_string());
        let token_endpoint = self
            .token_endpoint
            .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string());

        for endpoint in [&authorize_endpoint, &token_endpoint, &redirect_uri] {
            Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
                url: endpoint.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(Config {
            client_id,
            authorize_endpoint,
            token_endpoint,
            redirect_uri,
            scopes: self.scopes,
            timeout: self.timeout.unwrap_or(Duration::from_secs(30)),
            refresh_margin_secs: self
                .refresh_margin_secs
                .unwrap_or(DEFAULT_REFRESH_MARGIN_SECS),
        })
    }
}

/// Create a new configuration builder.
pub fn config() -> ConfigBuilder {
    ConfigBuilder::new()
}
