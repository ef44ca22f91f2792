//! Handlers for the singleton `/about` profile.

use axum::{Json, extract::State};
use folio_core::{
  about::{About, AboutPatch},
  store::PortfolioStore,
};

use crate::{
  ApiState, JsonBody,
  error::ApiError,
  media::warn_if_untrusted,
  session::AdminSession,
};

/// The stored profile, creating the placeholder on first read.
async fn current<S>(state: &ApiState<S>) -> Result<About, ApiError>
where
  S: PortfolioStore,
{
  if let Some(about) = state.store.get_about().await.map_err(ApiError::store)? {
    return Ok(about);
  }
  tracing::info!("no profile stored yet; saving the placeholder");
  state
    .store
    .put_about(About::placeholder(state.clock.now()))
    .await
    .map_err(ApiError::store)
}

/// `GET /about`
pub async fn get<S>(State(state): State<ApiState<S>>) -> Result<Json<About>, ApiError>
where
  S: PortfolioStore,
{
  Ok(Json(current(&state).await?))
}

/// `PUT /about`
pub async fn update<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<AboutPatch>,
) -> Result<Json<About>, ApiError>
where
  S: PortfolioStore,
{
  let patch = body.validate()?;
  for (field, url) in patch.image_urls() {
    warn_if_untrusted(&state.settings.trusted_media_hosts, field, url);
  }

  let saved = state.store.update_about(patch).await.map_err(ApiError::store)?;
  Ok(Json(saved))
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use folio_core::store::PortfolioStore as _;
  use serde_json::json;

  use crate::test_support::{harness, json};

  #[tokio::test]
  async fn first_read_persists_placeholder() {
    let h = harness().await;
    assert!(h.state.store.get_about().await.unwrap().is_none());

    let resp = h.send("GET", "/about", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp).await;
    assert!(body["name"].is_string());
    assert!(body["socialLinks"].is_object());

    assert!(h.state.store.get_about().await.unwrap().is_some());
  }

  #[tokio::test]
  async fn update_merges_fields() {
    let h = harness().await;
    let resp = h
      .send_admin(
        "PUT",
        "/about",
        Some(json!({
          "name": "Jordan Reyes",
          "skills": ["Recruiting", "Brand strategy"],
          "socialLinks": { "linkedin": "https://linkedin.com/in/jreyes" },
        })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json(h.send("GET", "/about", None, None).await).await;
    assert_eq!(body["name"], "Jordan Reyes");
    assert_eq!(body["skills"], json!(["Recruiting", "Brand strategy"]));
    assert_eq!(body["socialLinks"]["linkedin"], "https://linkedin.com/in/jreyes");
  }

  #[tokio::test]
  async fn update_rejects_bad_input() {
    let h = harness().await;
    let resp = h
      .send_admin("PUT", "/about", Some(json!({ "profileImage": "not a url" })))
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = h.send("PUT", "/about", None, Some(json!({ "name": "x" }))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn untrusted_image_host_is_still_saved() {
    let h = harness().await;
    let resp = h
      .send_admin(
        "PUT",
        "/about",
        Some(json!({ "heroImage": "https://images.example.org/hero.jpg" })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["heroImage"], "https://images.example.org/hero.jpg");
  }
}
