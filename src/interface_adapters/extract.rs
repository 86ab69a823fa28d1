use crate::interface_adapters::protocol::{PlaybackErrorResponse, SessionResponse};
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

// JSON body for session routes; any rejection becomes a 400 in the session envelope.
pub struct SessionJson<T>(pub T);

// JSON body for playback routes; any rejection becomes a 400 in the `{error}` envelope.
pub struct PlaybackJson<T>(pub T);

impl<S, T> FromRequest<S> for SessionJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<SessionResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                log_rejection(&rejection);
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(SessionResponse::failed(INVALID_BODY_MESSAGE)),
                ))
            }
        }
    }
}

impl<S, T> FromRequest<S> for PlaybackJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<PlaybackErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                log_rejection(&rejection);
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(PlaybackErrorResponse {
                        error: format!("{INVALID_BODY_MESSAGE}."),
                    }),
                ))
            }
        }
    }
}

// Parser detail stays in the logs; clients only see the generic message.
fn log_rejection(rejection: &JsonRejection) {
    tracing::debug!(
        status = %rejection.status(),
        error = %rejection.body_text(),
        "rejected request body"
    );
}
