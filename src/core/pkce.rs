//! PKCE
//!
//! RFC 7636 Proof Key for Code Exchange primitives. Only the S256 challenge
//! method is implemented; plain challenges defeat the point of PKCE.

use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Verifier length used for new authorization attempts.
pub const VERIFIER_LENGTH: usize = 64;

/// Generate a random code verifier of `length` unreserved characters.
///
/// # Panics
/// Panics if `length` is outside the 43..=128 range RFC 7636 requires.
pub fn generate_verifier(length: usize) -> String {
    assert!(
        (43..=128).contains(&length),
        "PKCE verifier length must be between 43 and 128"
    );

    let mut rng = rand::thread_rng();
    let bytes_needed = (length * 3 + 3) / 4;
    let random_bytes: Vec<u8> = (0..bytes_needed).map(|_| rng.gen()).collect();

    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&random_bytes);
    encoded[..length].to_string()
}

/// Compute the S256 challenge: `BASE64URL(SHA256(verifier))`.
pub fn code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
}

/// Validate verifier format: 43-128 unreserved characters.
pub fn is_valid_verifier(verifier: &str) -> bool {
    (43..=128).contains(&verifier.len())
        && verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
}
