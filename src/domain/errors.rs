// Domain-level errors for playback session workflows.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    MissingSessionId,
    InvalidEpisodeId,
    InvalidUserId,
    StorageFailure,
}

// Domain-level errors for signed URL issuance.
#[derive(Debug, PartialEq, Eq)]
pub enum PlaybackUrlError {
    InvalidPath,
    InvalidEpisodeId,
    ObjectNotFound,
    EpisodeAssetsMissing,
    SigningFailure,
}
