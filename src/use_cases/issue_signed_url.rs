use crate::domain::entities::{SIGNED_URL_TTL_SECONDS, SignedUrlGrant};
use crate::domain::errors::PlaybackUrlError;
use crate::domain::ports::{Clock, ObjectStorage};

// Whether the object must be confirmed present before a URL is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExistenceCheck {
    Required,
    Skip,
}

// Single-object signed URL use case with injected dependencies.
pub struct IssueSignedUrlUseCase<C, O> {
    pub clock: C,
    pub storage: O,
}

impl<C, O> IssueSignedUrlUseCase<C, O>
where
    C: Clock,
    O: ObjectStorage,
{
    pub async fn execute(
        &self,
        path: Option<String>,
        check: ExistenceCheck,
    ) -> Result<SignedUrlGrant, PlaybackUrlError> {
        let path = validate_object_path(path)?;

        if check == ExistenceCheck::Required {
            let exists = self.storage.exists(&path).await.map_err(|err| {
                tracing::error!(error = %err, %path, "failed to check object existence");
                PlaybackUrlError::SigningFailure
            })?;
            if !exists {
                tracing::info!(%path, "signed url requested for missing object");
                return Err(PlaybackUrlError::ObjectNotFound);
            }
        }

        sign_grant(&self.storage, path, self.clock.now_epoch_seconds())
    }
}

// Sign a read URL for `path` at `signed_at`; the grant expires one TTL later.
pub(crate) fn sign_grant<O>(
    storage: &O,
    path: String,
    signed_at: u64,
) -> Result<SignedUrlGrant, PlaybackUrlError>
where
    O: ObjectStorage,
{
    let url = storage
        .sign_read_url(&path, signed_at, SIGNED_URL_TTL_SECONDS)
        .map_err(|err| {
            tracing::error!(error = %err, %path, "failed to sign url");
            PlaybackUrlError::SigningFailure
        })?;

    Ok(SignedUrlGrant {
        path,
        url,
        expires_at: signed_at + SIGNED_URL_TTL_SECONDS,
    })
}

fn validate_object_path(path: Option<String>) -> Result<String, PlaybackUrlError> {
    let path = path
        .filter(|p| !p.trim().is_empty())
        .ok_or(PlaybackUrlError::InvalidPath)?;

    // Object keys are bucket-relative; refuse anything that looks like traversal.
    if path.starts_with('/') || path.split('/').any(|segment| segment == "..") {
        return Err(PlaybackUrlError::InvalidPath);
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{FakeStorage, FixedClock};

    #[tokio::test]
    async fn when_object_exists_then_url_expires_exactly_one_hour_after_signing() {
        let use_case = IssueSignedUrlUseCase {
            clock: FixedClock(1_700_000_000),
            storage: FakeStorage::with_objects(["videos/intro.mp4"]),
        };

        let grant = use_case
            .execute(Some("videos/intro.mp4".to_string()), ExistenceCheck::Required)
            .await
            .expect("expected url to be issued");

        assert_eq!(grant.path, "videos/intro.mp4");
        assert_eq!(grant.expires_at, 1_700_003_600);
        assert!(grant.url.starts_with("https://"));
        assert!(grant.url.contains("X-Goog-Expires=3600"));
    }

    #[tokio::test]
    async fn when_object_is_missing_then_returns_not_found() {
        let use_case = IssueSignedUrlUseCase {
            clock: FixedClock(1_700_000_000),
            storage: FakeStorage::default(),
        };

        let result = use_case
            .execute(Some("videos/missing.mp4".to_string()), ExistenceCheck::Required)
            .await;

        assert_eq!(result, Err(PlaybackUrlError::ObjectNotFound));
    }

    #[tokio::test]
    async fn when_check_is_skipped_then_url_is_issued_without_lookup() {
        let storage = FakeStorage::default();
        let use_case = IssueSignedUrlUseCase {
            clock: FixedClock(1_700_000_000),
            storage: storage.clone(),
        };

        let grant = use_case
            .execute(Some("videos/missing.mp4".to_string()), ExistenceCheck::Skip)
            .await
            .expect("expected url to be issued unconditionally");

        assert_eq!(grant.expires_at, 1_700_003_600);
        assert_eq!(storage.exists_call_count(), 0);
    }

    #[tokio::test]
    async fn when_existence_check_fails_then_returns_signing_failure() {
        let storage = FakeStorage {
            fail_exists: true,
            ..FakeStorage::default()
        };
        let use_case = IssueSignedUrlUseCase {
            clock: FixedClock(1_700_000_000),
            storage,
        };

        let result = use_case
            .execute(Some("videos/intro.mp4".to_string()), ExistenceCheck::Required)
            .await;

        assert_eq!(result, Err(PlaybackUrlError::SigningFailure));
    }

    #[tokio::test]
    async fn when_signer_fails_then_returns_signing_failure() {
        let storage = FakeStorage {
            fail_sign: true,
            ..FakeStorage::with_objects(["videos/intro.mp4"])
        };
        let use_case = IssueSignedUrlUseCase {
            clock: FixedClock(1_700_000_000),
            storage,
        };

        let result = use_case
            .execute(Some("videos/intro.mp4".to_string()), ExistenceCheck::Required)
            .await;

        assert_eq!(result, Err(PlaybackUrlError::SigningFailure));
    }

    #[tokio::test]
    async fn when_path_is_blank_or_escapes_bucket_then_returns_invalid_path() {
        let storage = FakeStorage::default();
        let use_case = IssueSignedUrlUseCase {
            clock: FixedClock(1_700_000_000),
            storage: storage.clone(),
        };

        for path in [None, Some(""), Some("  "), Some("/abs/file"), Some("a/../b"), Some("..")] {
            let result = use_case
                .execute(path.map(str::to_string), ExistenceCheck::Required)
                .await;
            assert_eq!(result, Err(PlaybackUrlError::InvalidPath), "path {path:?}");
        }
        assert_eq!(storage.exists_call_count(), 0);
    }

    #[tokio::test]
    async fn when_path_has_empty_segments_or_trailing_slash_then_url_is_issued() {
        let use_case = IssueSignedUrlUseCase {
            clock: FixedClock(1_700_000_000),
            storage: FakeStorage::default(),
        };

        for path in ["a//b", "dir/", "a/./b"] {
            let grant = use_case
                .execute(Some(path.to_string()), ExistenceCheck::Skip)
                .await
                .expect("expected url to be issued");
            assert_eq!(grant.path, path);
        }
    }
}
