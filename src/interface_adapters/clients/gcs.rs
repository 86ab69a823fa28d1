use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{Clock, ObjectStorage};

// Object keys keep their slashes; everything else outside the unreserved set is escaped.
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// Query values escape slashes too.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const SIGNING_ALGORITHM: &str = "GOOG4-RSA-SHA256";

// Existence checks only need to outlive one request.
const EXISTENCE_CHECK_TTL_SECONDS: u64 = 60;

// Subset of a service account key file needed for V4 signing.
#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
}

#[derive(Debug)]
pub enum GcsClientError {
    Credentials(String),
    Signing(String),
    Transport(reqwest::Error),
    UnexpectedStatus(StatusCode),
}

impl fmt::Display for GcsClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcsClientError::Credentials(message) => {
                write!(f, "storage credentials error: {message}")
            }
            GcsClientError::Signing(message) => write!(f, "storage signing error: {message}"),
            GcsClientError::Transport(err) => write!(f, "storage transport error: {err}"),
            GcsClientError::UnexpectedStatus(status) => {
                write!(f, "storage responded with unexpected status {status}")
            }
        }
    }
}

impl std::error::Error for GcsClientError {}

// Pieces of a V4 signature that are independent of the private key.
struct SigningPlan {
    canonical_uri: String,
    canonical_query: String,
    string_to_sign: String,
}

// Google Cloud Storage client that signs V4 URLs with a service account key.
#[derive(Clone)]
pub struct GcsStorageClient {
    http: reqwest::Client,
    client_email: String,
    private_key: RsaPrivateKey,
    bucket: String,
    host: String,
    clock: Arc<dyn Clock>,
}

impl GcsStorageClient {
    pub fn new(
        service_account_json: &str,
        bucket: impl Into<String>,
        host: impl Into<String>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GcsClientError> {
        let key: ServiceAccountKey = serde_json::from_str(service_account_json)
            .map_err(|err| GcsClientError::Credentials(format!("invalid key file: {err}")))?;
        let private_key = RsaPrivateKey::from_pkcs8_pem(&key.private_key)
            .map_err(|err| GcsClientError::Credentials(format!("invalid private key: {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GcsClientError::Transport)?;

        Ok(Self {
            http,
            client_email: key.client_email,
            private_key,
            bucket: bucket.into(),
            host: host.into(),
            clock,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    // Build a V4 signed URL for `method` on `object_path`, valid from
    // `signed_at` for `ttl_seconds`.
    pub fn signed_url(
        &self,
        method: &str,
        object_path: &str,
        signed_at: u64,
        ttl_seconds: u64,
    ) -> Result<String, GcsClientError> {
        let plan = self.signing_plan(method, object_path, signed_at, ttl_seconds)?;

        let signing_key = SigningKey::<Sha256>::new(self.private_key.clone());
        let signature = signing_key
            .try_sign(plan.string_to_sign.as_bytes())
            .map_err(|err| GcsClientError::Signing(err.to_string()))?;
        let signature_hex = hex::encode(signature.to_bytes());

        Ok(format!(
            "https://{host}{uri}?{query}&X-Goog-Signature={signature_hex}",
            host = self.host,
            uri = plan.canonical_uri,
            query = plan.canonical_query,
        ))
    }

    // HEAD the object through a short-lived signed URL.
    pub async fn object_exists(&self, object_path: &str) -> Result<bool, GcsClientError> {
        let url = self.existence_check_url(object_path)?;
        let response = self
            .http
            .head(url)
            .send()
            .await
            .map_err(GcsClientError::Transport)?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(GcsClientError::UnexpectedStatus(status)),
        }
    }

    fn existence_check_url(&self, object_path: &str) -> Result<String, GcsClientError> {
        let signed_at = self.clock.now_epoch_seconds();
        self.signed_url("HEAD", object_path, signed_at, EXISTENCE_CHECK_TTL_SECONDS)
    }

    fn signing_plan(
        &self,
        method: &str,
        object_path: &str,
        signed_at: u64,
        ttl_seconds: u64,
    ) -> Result<SigningPlan, GcsClientError> {
        let signed_at = i64::try_from(signed_at)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| GcsClientError::Signing(format!("invalid timestamp {signed_at}")))?;
        let datestamp = signed_at.format("%Y%m%d").to_string();
        let timestamp = signed_at.format("%Y%m%dT%H%M%SZ").to_string();

        let credential_scope = format!("{datestamp}/auto/storage/goog4_request");
        let credential = format!("{}/{}", self.client_email, credential_scope);

        let encoded_object = utf8_percent_encode(object_path.trim_start_matches('/'), PATH_SET);
        let canonical_uri = format!("/{}/{}", self.bucket, encoded_object);

        let canonical_headers = format!("host:{}\n", self.host);
        let signed_headers = "host";

        // Keys are already in sorted order.
        let canonical_query = [
            ("X-Goog-Algorithm", SIGNING_ALGORITHM.to_string()),
            (
                "X-Goog-Credential",
                utf8_percent_encode(&credential, QUERY_SET).to_string(),
            ),
            ("X-Goog-Date", timestamp.clone()),
            ("X-Goog-Expires", ttl_seconds.to_string()),
            ("X-Goog-SignedHeaders", signed_headers.to_string()),
        ]
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\nUNSIGNED-PAYLOAD"
        );
        let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign =
            format!("{SIGNING_ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_hash}");

        Ok(SigningPlan {
            canonical_uri,
            canonical_query,
            string_to_sign,
        })
    }
}

#[async_trait]
impl ObjectStorage for GcsStorageClient {
    async fn exists(&self, path: &str) -> Result<bool, String> {
        self.object_exists(path).await.map_err(|err| err.to_string())
    }

    fn sign_read_url(
        &self,
        path: &str,
        signed_at: u64,
        ttl_seconds: u64,
    ) -> Result<String, String> {
        self.signed_url("GET", path, signed_at, ttl_seconds)
            .map_err(|err| err.to_string())
    }
}
