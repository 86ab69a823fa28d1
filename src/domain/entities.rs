// Signed URLs live for one viewing session (in seconds).
pub const SIGNED_URL_TTL_SECONDS: u64 = 60 * 60;

// Liveness record for one playback session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaySession {
    pub session_id: String,
    pub episode_id: String,
    pub user_id: String,
    pub started_at: u64,
    pub last_heartbeat_at: u64,
}

// Time-limited read grant for a storage object. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedUrlGrant {
    pub path: String,
    pub url: String,
    pub expires_at: u64,
}

// Where an episode's HLS manifest and decryption key live in the bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpisodeAssetLayout {
    pub prefix: String,
    pub manifest_file: String,
    pub key_file: String,
}

impl EpisodeAssetLayout {
    pub fn manifest_path(&self, episode_id: &str) -> String {
        self.object_path(episode_id, &self.manifest_file)
    }

    pub fn key_path(&self, episode_id: &str) -> String {
        self.object_path(episode_id, &self.key_file)
    }

    fn object_path(&self, episode_id: &str, file: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{episode_id}/{file}")
        } else {
            format!("{prefix}/{episode_id}/{file}")
        }
    }
}

impl Default for EpisodeAssetLayout {
    fn default() -> Self {
        Self {
            prefix: "episodes".to_string(),
            manifest_file: "manifest.m3u8".to_string(),
            key_file: "enc.key".to_string(),
        }
    }
}
