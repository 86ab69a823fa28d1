pub mod gcs;

pub use gcs::{GcsClientError, GcsStorageClient};
