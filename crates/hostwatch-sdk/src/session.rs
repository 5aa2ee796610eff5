//! Credential holder shared by one or more listers.
//!
//! A [`Session`] owns the cached `Option<Credential>`. Listers hold it
//! through an `Arc`, so several listers (or tests) can share or swap it.
//! The async mutex stays locked across an authentication round-trip;
//! concurrent callers never observe a half-updated pair or authenticate
//! twice for the same rejected token.

use hostwatch_models::Credential;
use tokio::sync::{Mutex, MutexGuard};

/// In-memory credential cache. Starts empty; never persisted.
#[derive(Debug, Default)]
pub struct Session {
    credential: Mutex<Option<Credential>>,
}

impl Session {
    /// A session with no credential.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session pre-seeded with `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }

    /// Snapshot of the cached credential.
    pub async fn credential(&self) -> Option<Credential> {
        self.credential.lock().await.clone()
    }

    /// Replace the cached credential.
    pub async fn store(&self, credential: Credential) {
        *self.credential.lock().await = Some(credential);
    }

    /// Drop the cached credential.
    pub async fn invalidate(&self) {
        *self.credential.lock().await = None;
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Option<Credential>> {
        self.credential.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        assert!(Session::new().credential().await.is_none());
    }

    #[tokio::test]
    async fn store_replaces_wholesale() {
        let session = Session::with_credential(Credential::new("T1", "U1"));
        session.store(Credential::new("T2", "U2")).await;
        assert_eq!(session.credential().await, Some(Credential::new("T2", "U2")));
    }

    #[tokio::test]
    async fn invalidate_clears_both_fields() {
        let session = Session::with_credential(Credential::new("T1", "U1"));
        session.invalidate().await;
        assert_eq!(session.credential().await, None);
    }
}
