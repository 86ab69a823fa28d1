use std::{env, fs, time::Duration};

use crate::domain::entities::EpisodeAssetLayout;

// Runtime/server settings, all read from the environment with defaults.

pub fn http_port() -> u16 {
    env::var("PLAYBACK_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3004)
}

// Unset means sessions live in memory only.
pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty())
}

pub fn database_max_connections() -> u32 {
    env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5)
}

pub fn storage_bucket() -> Result<String, String> {
    env::var("STORAGE_BUCKET")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| "STORAGE_BUCKET must be set".to_string())
}

pub fn storage_host() -> String {
    env::var("STORAGE_HOST").unwrap_or_else(|_| "storage.googleapis.com".to_string())
}

// Inline key JSON wins over a key file path.
pub fn storage_service_account_json() -> Result<String, String> {
    if let Ok(inline) = env::var("STORAGE_SERVICE_ACCOUNT_JSON") {
        return Ok(inline);
    }

    let path = env::var("GOOGLE_APPLICATION_CREDENTIALS").map_err(|_| {
        "STORAGE_SERVICE_ACCOUNT_JSON or GOOGLE_APPLICATION_CREDENTIALS must be set".to_string()
    })?;
    fs::read_to_string(&path).map_err(|e| format!("failed to read service account key {path}: {e}"))
}

pub fn storage_request_timeout() -> Duration {
    let millis = env::var("STORAGE_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

pub fn episode_asset_layout() -> EpisodeAssetLayout {
    let mut layout = EpisodeAssetLayout::default();
    if let Ok(prefix) = env::var("EPISODE_ASSET_PREFIX") {
        layout.prefix = prefix;
    }
    layout
}

// 0 disables the stale-session sweeper.
pub fn session_stale_after_seconds() -> u64 {
    env::var("SESSION_STALE_AFTER_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300)
}

pub fn session_sweep_interval() -> Duration {
    let secs = env::var("SESSION_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(60);
    Duration::from_secs(secs)
}
