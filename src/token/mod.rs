//! Token Lifecycle
//!
//! Credential management: the lifecycle manager and the persistence seam.

pub mod manager;
pub mod storage;

pub use manager::TokenManager;
pub use storage::{CredentialStore, InMemoryCredentialStore, MockCredentialStore};
