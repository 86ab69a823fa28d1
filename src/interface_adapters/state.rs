use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::entities::{EpisodeAssetLayout, PlaySession};
use crate::domain::ports::{Clock, ObjectStorage, PlaySessionStore, SessionLookup};

// Process-wide state, built once at startup and shared with every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn PlaySessionStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub clock: Arc<dyn Clock>,
    pub asset_layout: EpisodeAssetLayout,
}

// In-memory session store used when no database is configured.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    pub sessions: Arc<Mutex<HashMap<String, PlaySession>>>,
}

#[async_trait]
impl PlaySessionStore for InMemorySessionStore {
    async fn upsert(&self, session: PlaySession) -> Result<(), String> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn touch(&self, session_id: &str, at: u64) -> Result<SessionLookup, String> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.last_heartbeat_at = at;
                Ok(SessionLookup::Found)
            }
            None => Ok(SessionLookup::NotFound),
        }
    }

    async fn remove(&self, session_id: &str) -> Result<bool, String> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(session_id).is_some())
    }

    async fn remove_stale(&self, cutoff: u64) -> Result<u64, String> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_heartbeat_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

// System clock adapter used by the use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
