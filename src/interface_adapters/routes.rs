use crate::interface_adapters::handlers::{
    end_session, heartbeat, issue_episode_urls, issue_signed_url, start_session,
};
use crate::interface_adapters::state::AppState;
use axum::{Router, routing::post};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session/start", post(start_session))
        .route("/session/heartbeat", post(heartbeat))
        .route("/session/end", post(end_session))
        .route("/playback/signed-url", post(issue_signed_url))
        .route("/playback/episode-urls", post(issue_episode_urls))
        .with_state(state)
}
