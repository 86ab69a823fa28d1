use crate::domain::errors::SessionError;
use crate::domain::ports::{Clock, PlaySessionStore, SessionLookup};
use crate::use_cases::require_session_id;

// Outcome of a heartbeat; an unknown session is reported, not raised.
#[derive(Debug, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    Updated,
    NotFound,
}

// Heartbeat use case with injected dependencies.
pub struct HeartbeatUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> HeartbeatUseCase<C, S>
where
    C: Clock,
    S: PlaySessionStore,
{
    pub async fn execute(
        &self,
        session_id: Option<String>,
    ) -> Result<HeartbeatOutcome, SessionError> {
        let session_id = require_session_id(session_id)?;
        let now = self.clock.now_epoch_seconds();

        let lookup = self
            .store
            .touch(&session_id, now)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, %session_id, "failed to record heartbeat");
                SessionError::StorageFailure
            })?;

        Ok(match lookup {
            SessionLookup::Found => HeartbeatOutcome::Updated,
            SessionLookup::NotFound => HeartbeatOutcome::NotFound,
        })
    }
}
