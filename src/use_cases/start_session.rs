use uuid::Uuid;

use crate::domain::entities::PlaySession;
use crate::domain::errors::SessionError;
use crate::domain::ports::{Clock, PlaySessionStore};
use crate::interface_adapters::protocol::StartSessionRequest;

// Response returned by the start-session use case.
pub struct StartSessionResponse {
    pub session_id: String,
    pub started_at: u64,
}

// Start-session use case with injected dependencies.
pub struct StartSessionUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> StartSessionUseCase<C, S>
where
    C: Clock,
    S: PlaySessionStore,
{
    pub async fn execute(
        &self,
        payload: StartSessionRequest,
    ) -> Result<StartSessionResponse, SessionError> {
        let episode_id = non_blank(payload.episode_id).ok_or(SessionError::InvalidEpisodeId)?;
        let user_id = non_blank(payload.user_id).ok_or(SessionError::InvalidUserId)?;

        // Clients may bring their own id; otherwise assign one here.
        let session_id =
            non_blank(payload.session_id).unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = self.clock.now_epoch_seconds();

        let session = PlaySession {
            session_id: session_id.clone(),
            episode_id,
            user_id,
            started_at: now,
            last_heartbeat_at: now,
        };

        self.store.upsert(session).await.map_err(|err| {
            tracing::error!(error = %err, %session_id, "failed to start session");
            SessionError::StorageFailure
        })?;

        Ok(StartSessionResponse {
            session_id,
            started_at: now,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
