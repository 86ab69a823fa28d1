use serde::{Deserialize, Serialize};

// Identifiers are optional at the wire level so a missing id becomes a 400
// from the use case rather than a deserialization rejection.

// Request payload for starting a playback session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub episode_id: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

// Request payload for heartbeat and end calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub session_id: Option<String>,
}

// Response envelope shared by all session routes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            session_id: None,
            message: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            session_id: None,
            message: Some(message.to_string()),
        }
    }
}

// Request payload for a single-object signed URL.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequest {
    pub path: Option<String>,
    // Defaults to checking that the object exists.
    pub check_exists: Option<bool>,
}

// Response payload for a single-object signed URL.
#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    pub signed_url: String,
}

// Request payload for an episode's manifest and key URLs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeUrlsRequest {
    pub episode_id: Option<String>,
}

// Response payload for an episode's manifest and key URLs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeUrlsResponse {
    pub manifest_url: String,
    pub key_url: String,
}

// Error envelope for playback URL routes.
#[derive(Debug, Serialize)]
pub struct PlaybackErrorResponse {
    pub error: String,
}
