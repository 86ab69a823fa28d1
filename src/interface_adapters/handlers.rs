use crate::domain::errors::{PlaybackUrlError, SessionError};
use crate::interface_adapters::extract::{PlaybackJson, SessionJson};
use crate::interface_adapters::protocol::{
    EpisodeUrlsRequest, EpisodeUrlsResponse, PlaybackErrorResponse, SessionRequest,
    SessionResponse, SignedUrlRequest, SignedUrlResponse, StartSessionRequest,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::end_session::EndSessionUseCase;
use crate::use_cases::heartbeat::{HeartbeatOutcome, HeartbeatUseCase};
use crate::use_cases::issue_episode_urls::IssueEpisodeUrlsUseCase;
use crate::use_cases::issue_signed_url::{ExistenceCheck, IssueSignedUrlUseCase};
use crate::use_cases::start_session::StartSessionUseCase;
use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

type SessionRejection = (StatusCode, Json<SessionResponse>);
type PlaybackRejection = (StatusCode, Json<PlaybackErrorResponse>);

const SESSION_NOT_FOUND_MESSAGE: &str = "Session not found or failed to update";

// Handler for registering a new playback session.
#[tracing::instrument(name = "start_session", skip_all, fields(episode_id = ?payload.episode_id))]
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    SessionJson(payload): SessionJson<StartSessionRequest>,
) -> Result<Json<SessionResponse>, SessionRejection> {
    let use_case = StartSessionUseCase {
        clock: state.clock.clone(),
        store: state.sessions.clone(),
    };

    let result = use_case.execute(payload).await.map_err(map_session_error)?;
    tracing::info!(session_id = %result.session_id, "playback session started");

    Ok(Json(SessionResponse {
        session_id: Some(result.session_id),
        ..SessionResponse::ok()
    }))
}

// Handler for refreshing a session's liveness.
#[tracing::instrument(name = "heartbeat", skip_all, fields(session_id = ?payload.session_id))]
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    SessionJson(payload): SessionJson<SessionRequest>,
) -> Result<Json<SessionResponse>, SessionRejection> {
    let use_case = HeartbeatUseCase {
        clock: state.clock.clone(),
        store: state.sessions.clone(),
    };

    match use_case
        .execute(payload.session_id)
        .await
        .map_err(map_session_error)?
    {
        HeartbeatOutcome::Updated => Ok(Json(SessionResponse::ok())),
        HeartbeatOutcome::NotFound => {
            tracing::debug!("heartbeat for unknown session");
            Err((
                StatusCode::NOT_FOUND,
                Json(SessionResponse::failed(SESSION_NOT_FOUND_MESSAGE)),
            ))
        }
    }
}

// Handler for ending a session. Ending an unknown session still succeeds.
#[tracing::instrument(name = "end_session", skip_all, fields(session_id = ?payload.session_id))]
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    SessionJson(payload): SessionJson<SessionRequest>,
) -> Result<Json<SessionResponse>, SessionRejection> {
    let use_case = EndSessionUseCase {
        store: state.sessions.clone(),
    };

    use_case
        .execute(payload.session_id)
        .await
        .map_err(map_session_error)?;

    Ok(Json(SessionResponse::ok()))
}

// Handler for a signed URL to a single storage object.
#[tracing::instrument(name = "issue_signed_url", skip_all, fields(path = ?payload.path))]
pub async fn issue_signed_url(
    State(state): State<Arc<AppState>>,
    PlaybackJson(payload): PlaybackJson<SignedUrlRequest>,
) -> Result<Json<SignedUrlResponse>, PlaybackRejection> {
    let check = if payload.check_exists.unwrap_or(true) {
        ExistenceCheck::Required
    } else {
        ExistenceCheck::Skip
    };
    let use_case = IssueSignedUrlUseCase {
        clock: state.clock.clone(),
        storage: state.storage.clone(),
    };

    let grant = use_case
        .execute(payload.path, check)
        .await
        .map_err(map_playback_error)?;

    Ok(Json(SignedUrlResponse {
        signed_url: grant.url,
    }))
}

// Handler for an episode's HLS manifest and decryption key URLs.
#[tracing::instrument(name = "issue_episode_urls", skip_all, fields(episode_id = ?payload.episode_id))]
pub async fn issue_episode_urls(
    State(state): State<Arc<AppState>>,
    PlaybackJson(payload): PlaybackJson<EpisodeUrlsRequest>,
) -> Result<Json<EpisodeUrlsResponse>, PlaybackRejection> {
    let use_case = IssueEpisodeUrlsUseCase {
        clock: state.clock.clone(),
        storage: state.storage.clone(),
        layout: state.asset_layout.clone(),
    };

    let urls = use_case
        .execute(payload.episode_id)
        .await
        .map_err(map_playback_error)?;

    Ok(Json(EpisodeUrlsResponse {
        manifest_url: urls.manifest.url,
        key_url: urls.key.url,
    }))
}

fn map_session_error(err: SessionError) -> SessionRejection {
    let (status, message) = match err {
        SessionError::MissingSessionId => (StatusCode::BAD_REQUEST, "sessionId is required"),
        SessionError::InvalidEpisodeId => (StatusCode::BAD_REQUEST, "episodeId is required"),
        SessionError::InvalidUserId => (StatusCode::BAD_REQUEST, "userId is required"),
        SessionError::StorageFailure => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    };

    (status, Json(SessionResponse::failed(message)))
}

// Storage details were logged by the use case; clients only get a generic message.
fn map_playback_error(err: PlaybackUrlError) -> PlaybackRejection {
    let (status, message) = match err {
        PlaybackUrlError::InvalidPath => {
            (StatusCode::BAD_REQUEST, "A valid storage path is required.")
        }
        PlaybackUrlError::InvalidEpisodeId => {
            (StatusCode::BAD_REQUEST, "A valid episode ID is required.")
        }
        PlaybackUrlError::ObjectNotFound => {
            (StatusCode::NOT_FOUND, "The requested file could not be found.")
        }
        PlaybackUrlError::EpisodeAssetsMissing => (
            StatusCode::NOT_FOUND,
            "Video files for this episode are missing.",
        ),
        PlaybackUrlError::SigningFailure => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate a playback URL.",
        ),
    };

    (
        status,
        Json(PlaybackErrorResponse {
            error: message.to_string(),
        }),
    )
}
