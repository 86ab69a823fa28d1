use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::PlaySession;

// Result of touching a session record; a missing record is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionLookup {
    Found,
    NotFound,
}

// Port for playback session persistence used by the session use cases.
#[async_trait]
pub trait PlaySessionStore: Send + Sync {
    // Insert or replace the record keyed by `session.session_id`.
    async fn upsert(&self, session: PlaySession) -> Result<(), String>;
    // Set `last_heartbeat_at` on an existing record.
    async fn touch(&self, session_id: &str, at: u64) -> Result<SessionLookup, String>;
    // Returns whether a record was removed.
    async fn remove(&self, session_id: &str) -> Result<bool, String>;
    // Remove records whose last heartbeat is older than `cutoff`.
    async fn remove_stale(&self, cutoff: u64) -> Result<u64, String>;
}

// Port for the credentialed object storage bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, String>;
    fn sign_read_url(
        &self,
        path: &str,
        signed_at: u64,
        ttl_seconds: u64,
    ) -> Result<String, String>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

// Shared state hands out `Arc<dyn ...>` handles; let them stand in for the port.
#[async_trait]
impl<T> PlaySessionStore for Arc<T>
where
    T: PlaySessionStore + ?Sized,
{
    async fn upsert(&self, session: PlaySession) -> Result<(), String> {
        (**self).upsert(session).await
    }

    async fn touch(&self, session_id: &str, at: u64) -> Result<SessionLookup, String> {
        (**self).touch(session_id, at).await
    }

    async fn remove(&self, session_id: &str) -> Result<bool, String> {
        (**self).remove(session_id).await
    }

    async fn remove_stale(&self, cutoff: u64) -> Result<u64, String> {
        (**self).remove_stale(cutoff).await
    }
}

#[async_trait]
impl<T> ObjectStorage for Arc<T>
where
    T: ObjectStorage + ?Sized,
{
    async fn exists(&self, path: &str) -> Result<bool, String> {
        (**self).exists(path).await
    }

    fn sign_read_url(
        &self,
        path: &str,
        signed_at: u64,
        ttl_seconds: u64,
    ) -> Result<String, String> {
        (**self).sign_read_url(path, signed_at, ttl_seconds)
    }
}

impl<T> Clock for Arc<T>
where
    T: Clock + ?Sized,
{
    fn now_epoch_seconds(&self) -> u64 {
        (**self).now_epoch_seconds()
    }
}
