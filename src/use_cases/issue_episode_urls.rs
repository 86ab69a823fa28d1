use crate::domain::entities::{EpisodeAssetLayout, SignedUrlGrant};
use crate::domain::errors::PlaybackUrlError;
use crate::domain::ports::{Clock, ObjectStorage};
use crate::use_cases::issue_signed_url::sign_grant;

// Manifest and key grants; playback needs both, so they are issued together or not at all.
#[derive(Debug)]
pub struct EpisodeUrls {
    pub manifest: SignedUrlGrant,
    pub key: SignedUrlGrant,
}

// Episode manifest/key URL use case with injected dependencies.
pub struct IssueEpisodeUrlsUseCase<C, O> {
    pub clock: C,
    pub storage: O,
    pub layout: EpisodeAssetLayout,
}

impl<C, O> IssueEpisodeUrlsUseCase<C, O>
where
    C: Clock,
    O: ObjectStorage,
{
    pub async fn execute(
        &self,
        episode_id: Option<String>,
    ) -> Result<EpisodeUrls, PlaybackUrlError> {
        let episode_id = validate_episode_id(episode_id)?;
        let manifest_path = self.layout.manifest_path(&episode_id);
        let key_path = self.layout.key_path(&episode_id);

        let (manifest_exists, key_exists) = tokio::join!(
            self.storage.exists(&manifest_path),
            self.storage.exists(&key_path)
        );
        let manifest_exists = manifest_exists.map_err(|err| lookup_failed(err, &manifest_path))?;
        let key_exists = key_exists.map_err(|err| lookup_failed(err, &key_path))?;

        if !(manifest_exists && key_exists) {
            tracing::warn!(
                %episode_id,
                manifest_exists,
                key_exists,
                "episode playback assets are incomplete"
            );
            return Err(PlaybackUrlError::EpisodeAssetsMissing);
        }

        let signed_at = self.clock.now_epoch_seconds();
        Ok(EpisodeUrls {
            manifest: sign_grant(&self.storage, manifest_path, signed_at)?,
            key: sign_grant(&self.storage, key_path, signed_at)?,
        })
    }
}

fn lookup_failed(err: String, path: &str) -> PlaybackUrlError {
    tracing::error!(error = %err, %path, "failed to check object existence");
    PlaybackUrlError::SigningFailure
}

fn validate_episode_id(episode_id: Option<String>) -> Result<String, PlaybackUrlError> {
    let episode_id = episode_id
        .filter(|id| !id.is_empty())
        .ok_or(PlaybackUrlError::InvalidEpisodeId)?;

    // The id becomes a path segment, so keep it to a safe charset.
    if !episode_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    {
        return Err(PlaybackUrlError::InvalidEpisodeId);
    }

    Ok(episode_id)
}
