//! Hosted media storage.
//!
//! Uploaded images are handed to a [`MediaHost`] and only the URL it returns
//! is kept. [`CloudinaryHost`] talks to Cloudinary's signed upload API.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use bytes::Bytes;
use folio_core::{clock::Clock, validate};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A file received from the admin UI.
#[derive(Debug, Clone)]
pub struct UploadFile {
  pub file_name:    Option<String>,
  pub content_type: Option<String>,
  pub bytes:        Bytes,
}

#[derive(Debug, Error)]
pub enum MediaError {
  #[error("request to media host failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("media host answered {status}: {body}")]
  Rejected { status: u16, body: String },

  #[error("media host response carried no URL")]
  MissingUrl,
}

/// Somewhere uploaded files can be stored and served from.
pub trait MediaHost: Send + Sync {
  /// Store `file` and return its public URL.
  fn upload(&self, file: UploadFile) -> BoxFuture<'_, Result<String, MediaError>>;
}

// ─── Cloudinary ──────────────────────────────────────────────────────────────

const CLOUDINARY_API: &str = "https://api.cloudinary.com/v1_1";

/// Credentials and options for [`CloudinaryHost`].
#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
  pub cloud_name: String,
  pub api_key:    String,
  pub api_secret: String,
  #[serde(default)]
  pub folder:     Option<String>,
}

pub struct CloudinaryHost {
  client: reqwest::Client,
  config: CloudinaryConfig,
  clock:  Arc<dyn Clock>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
  secure_url: Option<String>,
}

impl CloudinaryHost {
  pub fn new(config: CloudinaryConfig, clock: Arc<dyn Clock>) -> Result<Self, MediaError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config, clock })
  }

  fn endpoint(&self) -> String {
    format!("{CLOUDINARY_API}/{}/image/upload", self.config.cloud_name)
  }

  /// The signed parameters, sorted by name, without the file.
  fn signed_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
    let mut params = vec![("timestamp", timestamp.to_string())];
    if let Some(folder) = &self.config.folder {
      params.push(("folder", folder.clone()));
    }
    params.sort_by_key(|(name, _)| *name);
    params
  }

  /// `sha256("k1=v1&k2=v2" + api_secret)`, hex encoded.
  fn signature(&self, params: &[(&'static str, String)]) -> String {
    let joined = params
      .iter()
      .map(|(name, value)| format!("{name}={value}"))
      .collect::<Vec<_>>()
      .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(self.config.api_secret.as_bytes());
    hex::encode(hasher.finalize())
  }

  async fn send(&self, file: UploadFile) -> Result<String, MediaError> {
    let params = self.signed_params(self.clock.now().timestamp());
    let signature = self.signature(&params);

    let mut part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
      .file_name(file.file_name.unwrap_or_else(|| "upload".to_owned()));
    if let Some(content_type) = &file.content_type {
      part = part.mime_str(content_type)?;
    }

    let mut form = reqwest::multipart::Form::new()
      .part("file", part)
      .text("api_key", self.config.api_key.clone())
      .text("signature", signature)
      .text("signature_algorithm", "sha256");
    for (name, value) in params {
      form = form.text(name, value);
    }

    let resp = self.client.post(self.endpoint()).multipart(form).send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(MediaError::Rejected { status: status.as_u16(), body });
    }

    let parsed: UploadResponse = resp.json().await?;
    let url = parsed.secure_url.ok_or(MediaError::MissingUrl)?;
    tracing::info!(%url, "uploaded image");
    Ok(url)
  }
}

impl MediaHost for CloudinaryHost {
  fn upload(&self, file: UploadFile) -> BoxFuture<'_, Result<String, MediaError>> {
    Box::pin(self.send(file))
  }
}

// ─── Image URL policy ────────────────────────────────────────────────────────

/// Log image URLs that do not point at a trusted media host. They are stored
/// regardless.
pub fn warn_if_untrusted(trusted: &[String], field: &str, url: &str) {
  // Root-relative paths are served by the site itself.
  let Some(host) = validate::url_host(url) else {
    return;
  };
  if !trusted.iter().any(|t| t.eq_ignore_ascii_case(&host)) {
    tracing::warn!(field, %url, "image URL is not on a trusted media host");
  }
}
