//! Authorization Handshake
//!
//! Anti-forgery state for the redirect handshake. Exactly one authorization
//! attempt may be pending at a time; beginning a new one replaces any prior
//! attempt. The pending slot is consumed on the first completion attempt
//! regardless of outcome, so a replayed callback always fails even when it
//! carries the previously-correct state.

use std::sync::Mutex;

use base64::Engine;
use rand::Rng;

use crate::core::pkce;
use crate::error::{Error, Result};

const STATE_BYTES: usize = 32;

/// State and code verifier for one in-flight authorization attempt.
#[derive(Clone, Debug)]
pub struct PendingAuthorization {
    /// Anti-forgery state embedded in the authorization URL.
    pub state: String,
    /// PKCE code verifier; its challenge goes into the URL, the verifier
    /// itself is sent only with the code exchange.
    pub code_verifier: String,
}

/// Single-slot handshake guard.
///
/// Interior mutability keeps issue/consume exclusive while the handshake is
/// shared behind `Arc` with the rest of the lifecycle manager.
#[derive(Default)]
pub struct AuthorizationHandshake {
    pending: Mutex<Option<PendingAuthorization>>,
}

impl AuthorizationHandshake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an authorization attempt: generate fresh state and verifier,
    /// store them as the pending attempt, and return them for URL building.
    pub fn begin(&self) -> PendingAuthorization {
        let pending = PendingAuthorization {
            state: generate_state(),
            code_verifier: pkce::generate_verifier(pkce::VERIFIER_LENGTH),
        };

        *self.pending.lock().unwrap() = Some(pending.clone());
        pending
    }

    /// Complete the handshake against the state echoed by the redirect
    /// callback, returning the code verifier for the exchange.
    ///
    /// The pending slot is taken before any comparison: success and failure
    /// both leave no pending attempt behind.
    pub fn complete(&self, received_state: Option<&str>) -> Result<String> {
        let pending = self.pending.lock().unwrap().take();

        match (pending, received_state) {
            (Some(pending), Some(received)) if pending.state == received => {
                Ok(pending.code_verifier)
            }
            (pending, received) => Err(Error::InvalidState {
                supplied: pending.map(|p| p.state),
                received: received.map(String::from),
            }),
        }
    }

    /// Whether an authorization attempt is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.lock().unwrap().is_some()
    }

    /// Drop any pending attempt.
    pub fn reset(&self) {
        *self.pending.lock().unwrap() = None;
    }
}

fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; STATE_BYTES] = rng.gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_with_matching_state() {
        let handshake = AuthorizationHandshake::new();
        let pending = handshake.begin();

        let verifier = handshake.complete(Some(&pending.state)).unwrap();
        assert_eq!(verifier, pending.code_verifier);
        assert!(!handshake.is_pending());
    }

    #[test]
    fn test_replay_of_valid_state_fails() {
        let handshake = AuthorizationHandshake::new();
        let pending = handshake.begin();

        handshake.complete(Some(&pending.state)).unwrap();

        // Second callback with the same, previously-correct state
        let err = handshake.complete(Some(&pending.state)).unwrap_err();
        match err {
            Error::InvalidState { supplied, received } => {
                assert_eq!(supplied, None);
                assert_eq!(received, Some(pending.state));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatch_consumes_pending_state() {
        let handshake = AuthorizationHandshake::new();
        let pending = handshake.begin();

        let err = handshake.complete(Some("forged")).unwrap_err();
        match err {
            Error::InvalidState { supplied, received } => {
                assert_eq!(supplied, Some(pending.state.clone()));
                assert_eq!(received, Some("forged".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Even the correct state fails now; the slot was consumed.
        assert!(handshake.complete(Some(&pending.state)).is_err());
    }

    #[test]
    fn test_complete_without_pending_attempt() {
        let handshake = AuthorizationHandshake::new();
        let err = handshake.complete(Some("anything")).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                supplied: None,
                received: Some(_)
            }
        ));
    }

    #[test]
    fn test_begin_replaces_prior_attempt() {
        let handshake = AuthorizationHandshake::new();
        let first = handshake.begin();
        let second = handshake.begin();

        assert_ne!(first.state, second.state);
        assert!(handshake.complete(Some(&first.state)).is_err());
    }

    #[test]
    fn test_state_is_unguessable_length() {
        let state = generate_state();
        // 32 random bytes, base64url without padding
        assert_eq!(state.len(), 43);
    }
}
