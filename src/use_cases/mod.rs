pub mod end_session;
pub mod heartbeat;
pub mod issue_episode_urls;
pub mod issue_signed_url;
pub mod start_session;
pub mod sweep_stale;

#[cfg(test)]
pub(crate) mod test_support;

use crate::domain::errors::SessionError;

// Reject a missing or blank session id before any store call. The id is used verbatim.
pub(crate) fn require_session_id(session_id: Option<String>) -> Result<String, SessionError> {
    match session_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(SessionError::MissingSessionId),
    }
}
