//! Credential Persistence
//!
//! Pluggable sink/source for a serialized credential snapshot. The lifecycle
//! manager saves after every credential change and can restore a previously
//! saved session; it does not dictate how or where the snapshot is kept.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::CredentialSnapshot;

/// Persistence sink interface.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a snapshot, replacing any prior one.
    async fn save(&self, snapshot: &CredentialSnapshot) -> Result<(), StoreError>;

    /// Load the saved snapshot, if one exists.
    async fn load(&self) -> Result<Option<CredentialSnapshot>, StoreError>;

    /// Remove any saved snapshot.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store, mainly for tests and short-lived processes.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    snapshot: Mutex<Option<CredentialSnapshot>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn save(&self, snapshot: &CredentialSnapshot) -> Result<(), StoreError> {
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<CredentialSnapshot>, StoreError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.snapshot.lock().unwrap() = None;
        Ok(())
    }
}

/// Mock store with operation history and injectable failures.
#[derive(Default)]
pub struct MockCredentialStore {
    snapshot: Mutex<Option<CredentialSnapshot>>,
    save_history: Mutex<Vec<CredentialSnapshot>>,
    next_error: Mutex<Option<StoreError>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a snapshot.
    pub fn with_snapshot(self, snapshot: CredentialSnapshot) -> Self {
        *self.snapshot.lock().unwrap() = Some(snapshot);
        self
    }

    /// Fail the next operation with `error`.
    pub fn set_next_error(&self, error: StoreError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Snapshots passed to `save`, in order.
    pub fn save_history(&self) -> Vec<CredentialSnapshot> {
        self.save_history.lock().unwrap().clone()
    }

    fn check_error(&self) -> Result<(), StoreError> {
        match self.next_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn save(&self, snapshot: &CredentialSnapshot) -> Result<(), StoreError> {
        self.check_error()?;
        self.save_history.lock().unwrap().push(snapshot.clone());
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<CredentialSnapshot>, StoreError> {
        self.check_error()?;
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_error()?;
        *self.snapshot.lock().unwrap() = None;
        Ok(())
    }
}
