//! Signed uploads to the Cloudinary image API.
//!
//! Every upload is a `POST {api_base}/v1_1/{cloud_name}/image/upload`
//! multipart request carrying the file, the API key, a UNIX timestamp, the
//! target folder and a SHA-256 signature over the signed parameters.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use emlak_core::error::UpstreamError;
use emlak_core::gateway::{ImageHost, ImageUpload};

/// Default target folder for listing photos.
pub const DEFAULT_FOLDER: &str = "sbo-emlak/listings";

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Credentials and target of the image host.
///
/// | Env var                 | Default                      |
/// |-------------------------|------------------------------|
/// | `CLOUDINARY_CLOUD_NAME` | (required)                   |
/// | `CLOUDINARY_API_KEY`    | (required)                   |
/// | `CLOUDINARY_API_SECRET` | (required)                   |
/// | `CLOUDINARY_FOLDER`     | `sbo-emlak/listings`         |
/// | `CLOUDINARY_API_BASE`   | `https://api.cloudinary.com` |
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl CloudinaryConfig {
    /// Load from the environment.
    ///
    /// Returns `None` unless cloud name, key and secret are all set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Some(Self {
            cloud_name: var("CLOUDINARY_CLOUD_NAME")?,
            api_key: var("CLOUDINARY_API_KEY")?,
            api_secret: var("CLOUDINARY_API_SECRET")?,
            folder: var("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            api_base: var("CLOUDINARY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(60),
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

/// Signature over the signed upload parameters.
///
/// Parameters are sorted by name, joined as `k=v` with `&`, suffixed with
/// the API secret and hashed with SHA-256 (lowercase hex).
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(format!("{to_sign}{api_secret}").as_bytes());
    format!("{digest:x}")
}

/// The part of the upload response we use.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// HTTP client for one Cloudinary account.
pub struct CloudinaryClient {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { client, config }
    }

    fn form(&self, image: ImageUpload, timestamp: i64) -> Result<Form, UpstreamError> {
        let timestamp = timestamp.to_string();
        let signature = sign(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let file = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| UpstreamError::Request(format!("invalid content type: {e}")))?;

        Ok(Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256"))
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, image: ImageUpload) -> Result<String, UpstreamError> {
        let file_name = image.file_name.clone();
        let form = self.form(image, chrono::Utc::now().timestamp())?;

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        tracing::debug!(file = %file_name, url = %parsed.secure_url, "Image uploaded");
        Ok(parsed.secure_url)
    }
}
