use crate::domain::errors::SessionError;
use crate::domain::ports::PlaySessionStore;
use crate::use_cases::require_session_id;

// Response returned by the end-session use case.
pub struct EndSessionResponse {
    // Whether a record was actually deleted; callers see success either way.
    pub removed: bool,
}

// End-session use case with injected dependencies.
pub struct EndSessionUseCase<S> {
    pub store: S,
}

impl<S> EndSessionUseCase<S>
where
    S: PlaySessionStore,
{
    pub async fn execute(
        &self,
        session_id: Option<String>,
    ) -> Result<EndSessionResponse, SessionError> {
        let session_id = require_session_id(session_id)?;

        let removed = self.store.remove(&session_id).await.map_err(|err| {
            tracing::error!(error = %err, %session_id, "failed to end session");
            SessionError::StorageFailure
        })?;

        if !removed {
            tracing::debug!(%session_id, "end requested for unknown session");
        }

        Ok(EndSessionResponse { removed })
    }
}
