//! Token Lifecycle Manager
//!
//! The orchestrating core of the flow. Owns the single credential cell,
//! decides when a refresh is due, serializes concurrent refresh attempts,
//! applies PKCE refresh-token rotation, and enforces scope requirements
//! before callers spend a network round-trip.
//!
//! Lifecycle states map onto the fields: no credential is `Unauthenticated`,
//! a pending handshake slot is `Authorizing`, a stored credential is
//! `Authenticated`. Only `Authenticated` hands out access tokens.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::core::pkce;
use crate::core::transport::{HttpRequest, HttpTransport};
use crate::core::AuthorizationHandshake;
use crate::error::{status_error, Error, Result, TransportError};
use crate::scope::ScopeSet;
use crate::token::storage::CredentialStore;
use crate::types::auth::{encode_pairs, AuthorizeUrl, CodeExchangeRequest, RefreshRequest};
use crate::types::{Config, Credential, TokenResponse};

/// Token lifecycle manager for the authorization code + PKCE flow.
///
/// Callers share one instance explicitly (typically behind an `Arc`); there
/// is no process-wide singleton. All reads of the cached credential proceed
/// concurrently; only the refresh-and-replace sequence is serialized.
pub struct TokenManager<T: HttpTransport> {
    config: Config,
    transport: Arc<T>,
    store: Option<Arc<dyn CredentialStore>>,
    handshake: AuthorizationHandshake,
    /// The single owned credential cell. Mutated only by the refresh
    /// protocol, initial grant, restore, and revocation.
    credential: RwLock<Option<Credential>>,
    /// Guards the refresh-and-replace critical section. Under PKCE's
    /// single-use rotation a redundant concurrent refresh would present a
    /// stale refresh token and poison the credential.
    refresh_gate: Mutex<()>,
}

impl<T: HttpTransport> TokenManager<T> {
    pub fn new(config: Config, transport: Arc<T>) -> Self {
        Self {
            config,
            transport,
            store: None,
            handshake: AuthorizationHandshake::new(),
            credential: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Attach a persistence sink. A snapshot is saved after every credential
    /// change and cleared on revocation.
    pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Begin an authorization attempt: issue fresh state and PKCE material
    /// and build the URL the user must be directed to.
    pub fn begin_authorization(&self) -> AuthorizeUrl {
        let pending = self.handshake.begin();
        let challenge = pkce::code_challenge(&pending.code_verifier);
        let scope = self.config.scopes.to_string();

        let mut pairs = vec![
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("state", pending.state.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", challenge.as_str()),
        ];
        if !scope.is_empty() {
            pairs.push(("scope", scope.as_str()));
        }

        let url = format!(
            "{}?{}",
            self.config.authorize_endpoint,
            encode_pairs(&pairs)
        );

        AuthorizeUrl {
            url,
            state: pending.state,
        }
    }

    /// Complete authorization with the code and state from the redirect
    /// callback: validate state, exchange the code, store the credential.
    ///
    /// State validation happens before any network call; a forged or
    /// replayed callback costs no round-trip.
    pub async fn complete_authorization(
        &self,
        code: &str,
        received_state: Option<&str>,
    ) -> Result<()> {
        let code_verifier = self.handshake.complete(received_state)?;

        let request = CodeExchangeRequest {
            code: code.to_string(),
            redirect_uri: self.config.redirect_uri.clone(),
            client_id: self.config.client_id.clone(),
            code_verifier,
        };

        debug!(client_id = %self.config.client_id, "exchanging authorization code");
        let response = self.send_token_request(request.form_body()).await?;

        let credential = Credential::from_response(&response, Utc::now(), &self.config.scopes);
        *self.credential.write().await = Some(credential);

        debug!("authorization complete");
        self.persist().await
    }

    /// A currently-valid access token, refreshing first when the cached one
    /// has expired or is inside the safety margin.
    pub async fn access_token(&self) -> Result<String> {
        {
            let guard = self.credential.read().await;
            let credential = guard.as_ref().ok_or_else(no_credential)?;
            if !credential.is_expired(self.margin()) {
                return Ok(credential.access_token().to_string());
            }
        }

        self.refresh_if_stale().await?;

        let guard = self.credential.read().await;
        let credential = guard.as_ref().ok_or_else(no_credential)?;
        Ok(credential.access_token().to_string())
    }

    /// Force a refresh now.
    ///
    /// On success the stored credential is replaced wholesale, rotated
    /// refresh token included. On failure the prior credential is left
    /// untouched and the error surfaced unchanged.
    pub async fn refresh(&self) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;
        self.perform_refresh().await
    }

    /// Single-flight refresh: the first stale caller performs the network
    /// call, concurrent callers block on the gate and then find the
    /// credential already fresh.
    async fn refresh_if_stale(&self) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;

        {
            let guard = self.credential.read().await;
            if let Some(credential) = guard.as_ref() {
                if !credential.is_expired(self.margin()) {
                    return Ok(());
                }
            }
        }

        self.perform_refresh().await
    }

    /// The refresh-and-replace sequence. Caller must hold the refresh gate.
    async fn perform_refresh(&self) -> Result<()> {
        let (refresh_token, granted_scopes) = {
            let guard = self.credential.read().await;
            let credential = guard.as_ref().ok_or_else(no_credential)?;
            let token = credential.refresh_token().ok_or_else(|| Error::Other {
                message: "no refresh token available; re-authorization required".to_string(),
            })?;
            (token.to_string(), credential.scopes.clone())
        };

        let request = RefreshRequest {
            refresh_token: refresh_token.clone(),
            client_id: self.config.client_id.clone(),
        };

        debug!("refreshing access token");
        let response = self.send_token_request(request.form_body()).await?;

        // PKCE refresh tokens are single-use: the server must rotate. A
        // response without a new refresh token leaves us unable to refresh
        // again, which is a protocol violation to surface, not to paper over.
        if response.refresh_token.is_none() {
            warn!("token endpoint did not rotate the refresh token");
            return Err(Error::Other {
                message: "PKCE refresh response did not include a rotated refresh token"
                    .to_string(),
            });
        }

        let credential = Credential::from_response(&response, Utc::now(), &granted_scopes);

        // A revocation or re-authorization that landed while the exchange was
        // in flight must not be undone by a late response. Replace only if the
        // cell still holds the credential whose refresh token we presented.
        {
            let mut guard = self.credential.write().await;
            match guard.as_ref() {
                Some(current) if current.refresh_token() == Some(refresh_token.as_str()) => {
                    *guard = Some(credential);
                }
                Some(_) => {
                    debug!("credential replaced during refresh; discarding response");
                    return Ok(());
                }
                None => {
                    debug!("credential revoked during refresh; discarding response");
                    return Err(Error::Unauthorized {
                        message: "credential was revoked while a refresh was in flight"
                            .to_string(),
                    });
                }
            }
        }

        debug!("access token refreshed");
        self.persist().await
    }

    /// Check a scope requirement against the granted scopes. No side effect.
    pub async fn authorize(&self, required: &ScopeSet) -> Result<()> {
        let guard = self.credential.read().await;
        let credential = guard.as_ref().ok_or_else(no_credential)?;

        if required.is_subset_of(&credential.scopes) {
            Ok(())
        } else {
            Err(Error::InsufficientScope {
                required: required.clone(),
                authorized: credential.scopes.clone(),
            })
        }
    }

    /// Clear the stored credential and any pending handshake; idempotent.
    pub async fn revoke(&self) -> Result<()> {
        *self.credential.write().await = None;
        self.handshake.reset();

        if let Some(store) = &self.store {
            store.clear().await?;
        }

        debug!("credential revoked");
        Ok(())
    }

    /// Restore a previously saved credential snapshot from the persistence
    /// sink. Returns `false` when no snapshot exists. An expired snapshot is
    /// still restored; the next token request will refresh it.
    pub async fn restore(&self) -> Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };

        match store.load().await? {
            Some(snapshot) => {
                *self.credential.write().await = Some(Credential::from_snapshot(snapshot));
                debug!("credential restored from store");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a credential is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_some()
    }

    fn margin(&self) -> Duration {
        Duration::seconds(self.config.refresh_margin_secs)
    }

    async fn send_token_request(&self, body: String) -> Result<TokenResponse> {
        let request =
            HttpRequest::post_form(self.config.token_endpoint.clone(), body, self.config.timeout);

        let response = self.transport.send(request).await?;

        if response.status != 200 {
            let error = status_error(response.status, &response.body);
            warn!(status = %response.status, code = error.code(), "token endpoint rejected request");
            return Err(error);
        }

        serde_json::from_str(&response.body).map_err(|e| {
            Error::Transport(TransportError::InvalidResponse {
                message: e.to_string(),
            })
        })
    }

    async fn persist(&self) -> Result<()> {
        if let Some(store) = &self.store {
            let snapshot = {
                let guard = self.credential.read().await;
                guard.as_ref().map(Credential::snapshot)
            };
            if let Some(snapshot) = snapshot {
                store.save(&snapshot).await?;
            }
        }
        Ok(())
    }
}

fn no_credential() -> Error {
    Error::Unauthorized {
        message: "no credential established; complete authorization first".to_string(),
    }
}
