use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::entities::PlaySession;
use crate::domain::ports::{Clock, ObjectStorage, PlaySessionStore, SessionLookup};

pub(crate) type SessionTable = Arc<Mutex<HashMap<String, PlaySession>>>;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub upsert: bool,
    pub touch: bool,
    pub remove: bool,
    pub remove_stale: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingStore {
    sessions: SessionTable,
    failures: FailureFlags,
    // Counts every port call so tests can assert that validation short-circuits.
    calls: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureFlags::default(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_session(&self, session: PlaySession) {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(session.session_id.clone(), session);
    }

    pub(crate) fn get_test_session(&self, session_id: &str) -> Option<PlaySession> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.get(session_id).cloned()
    }

    pub(crate) fn session_count(&self) -> usize {
        self.sessions.lock().expect("sessions mutex poisoned").len()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn test_session(session_id: &str, last_heartbeat_at: u64) -> PlaySession {
    PlaySession {
        session_id: session_id.to_string(),
        episode_id: "ep1".to_string(),
        user_id: "user-1".to_string(),
        started_at: last_heartbeat_at,
        last_heartbeat_at,
    }
}

#[async_trait]
impl PlaySessionStore for RecordingStore {
    async fn upsert(&self, session: PlaySession) -> Result<(), String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.upsert {
            return Err("upsert failed".to_string());
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn touch(&self, session_id: &str, at: u64) -> Result<SessionLookup, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.touch {
            return Err("touch failed".to_string());
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        match guard.get_mut(session_id) {
            Some(session) => {
                session.last_heartbeat_at = at;
                Ok(SessionLookup::Found)
            }
            None => Ok(SessionLookup::NotFound),
        }
    }

    async fn remove(&self, session_id: &str) -> Result<bool, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.remove {
            return Err("remove failed".to_string());
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.remove(session_id).is_some())
    }

    async fn remove_stale(&self, cutoff: u64) -> Result<u64, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.remove_stale {
            return Err("remove_stale failed".to_string());
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        let before = guard.len();
        guard.retain(|_, session| session.last_heartbeat_at >= cutoff);
        Ok((before - guard.len()) as u64)
    }
}

// Bucket stand-in: a set of object paths plus toggles for infrastructure failure.
#[derive(Clone, Default)]
pub(crate) struct FakeStorage {
    pub objects: Arc<Mutex<HashSet<String>>>,
    pub fail_exists: bool,
    pub fail_sign: bool,
    pub exists_calls: Arc<AtomicUsize>,
}

impl FakeStorage {
    pub(crate) fn with_objects<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let storage = Self::default();
        {
            let mut guard = storage.objects.lock().expect("objects mutex poisoned");
            guard.extend(paths.into_iter().map(Into::into));
        }
        storage
    }

    pub(crate) fn exists_call_count(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn exists(&self, path: &str) -> Result<bool, String> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists {
            return Err("connection reset by storage.internal:443".to_string());
        }
        let guard = self.objects.lock().expect("objects mutex poisoned");
        Ok(guard.contains(path))
    }

    fn sign_read_url(
        &self,
        path: &str,
        signed_at: u64,
        ttl_seconds: u64,
    ) -> Result<String, String> {
        if self.fail_sign {
            return Err("invalid service account key".to_string());
        }
        Ok(format!(
            "https://storage.test/bucket/{path}?X-Goog-Date={signed_at}&X-Goog-Expires={ttl_seconds}"
        ))
    }
}
