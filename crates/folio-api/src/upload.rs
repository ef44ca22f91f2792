//! `POST /upload`: relay an image to the media host.
//!
//! Multipart body with a single `file` field. Responds `{"url": ".."}`.

use axum::{
  Json,
  extract::{Multipart, State},
};
use folio_core::store::PortfolioStore;
use serde_json::{Value, json};

use crate::{
  ApiState,
  error::ApiError,
  media::UploadFile,
  session::AdminSession,
};

/// `POST /upload`
pub async fn handler<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  mut multipart: Multipart,
) -> Result<Json<Value>, ApiError>
where
  S: PortfolioStore,
{
  let mut file = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.body_text()))?
  {
    if field.name() != Some("file") {
      continue;
    }
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);
    let bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    file = Some(UploadFile { file_name, content_type, bytes });
    break;
  }

  let Some(file) = file.filter(|f| !f.bytes.is_empty()) else {
    return Err(ApiError::BadRequest("No file uploaded".to_owned()));
  };

  let Some(media) = &state.media else {
    tracing::warn!("upload attempted but no media host is configured");
    return Err(ApiError::Upload("no media host configured".to_owned()));
  };

  let size = file.bytes.len();
  let url = media
    .upload(file)
    .await
    .map_err(|e| ApiError::Upload(e.to_string()))?;
  tracing::debug!(size, %url, "relayed upload");
  Ok(Json(json!({ "url": url })))
}
