//! Handlers for `/projects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/projects` | Canonical order: rank asc, newest first on ties |
//! | `POST`   | `/projects` | Session required |
//! | `PUT`    | `/projects/reorder` | Body: `{"itemIds":[..]}`; session required |
//! | `GET`    | `/projects/:id` | 404 if not found |
//! | `PUT`    | `/projects/:id` | Partial update; `{"order":n}` moves one item |
//! | `DELETE` | `/projects/:id` | Session required |

use std::collections::HashSet;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  ObjectId,
  project::{NewProject, Project, ProjectPatch},
  store::PortfolioStore,
};
use serde_json::{Value, json};

use crate::{
  ApiState, JsonBody,
  error::ApiError,
  media::warn_if_untrusted,
  session::AdminSession,
};

const NOT_FOUND: &str = "Project not found";

fn parse_id(raw: &str) -> Result<ObjectId, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest("Invalid project ID format".to_owned()))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /projects`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Project>>, ApiError>
where
  S: PortfolioStore,
{
  let projects = state.store.list_projects().await.map_err(ApiError::store)?;
  Ok(Json(projects))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /projects/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Project>, ApiError>
where
  S: PortfolioStore,
{
  let id = parse_id(&id)?;
  let project = state
    .store
    .get_project(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;
  Ok(Json(project))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /projects`
pub async fn create<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NewProject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortfolioStore,
{
  let input = body.validate()?;
  warn_if_untrusted(
    &state.settings.trusted_media_hosts,
    "imageUrl",
    &input.image_url,
  );
  let project = state
    .store
    .create_project(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(project = %project.id, "created project");
  Ok((StatusCode::CREATED, Json(project)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /projects/:id`
pub async fn update<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<ProjectPatch>,
) -> Result<Json<Project>, ApiError>
where
  S: PortfolioStore,
{
  let id = parse_id(&id)?;
  let patch = body.validate()?;
  if let Some(url) = &patch.image_url {
    warn_if_untrusted(&state.settings.trusted_media_hosts, "imageUrl", url);
  }
  let project = state
    .store
    .update_project(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;
  Ok(Json(project))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /projects/:id`
pub async fn delete_one<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: PortfolioStore,
{
  let id = parse_id(&id)?;
  let deleted = state.store.delete_project(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound(NOT_FOUND));
  }
  tracing::info!(project = %id, "deleted project");
  Ok(Json(json!({})))
}

// ─── Reorder ─────────────────────────────────────────────────────────────────

/// Pull the id permutation out of a reorder body. Every id must parse before
/// anything is written.
fn reorder_ids(body: &Value) -> Result<Vec<ObjectId>, ApiError> {
  let list = body
    .get("itemIds")
    .or_else(|| body.get("projectIds"))
    .and_then(Value::as_array)
    .ok_or_else(|| ApiError::BadRequest("itemIds must be an array".to_owned()))?;

  list
    .iter()
    .map(|v| {
      v.as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("invalid item id: {v}")))
    })
    .collect()
}

/// `PUT /projects/reorder`
pub async fn reorder<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>, ApiError>
where
  S: PortfolioStore,
{
  let ids = reorder_ids(&body)?;
  let matched = state
    .store
    .reorder_projects(&ids)
    .await
    .map_err(ApiError::store)?;
  let requested = ids.iter().collect::<HashSet<_>>().len();
  if matched < requested {
    tracing::debug!(requested, matched, "reorder skipped unknown ids");
  }
  Ok(Json(json!({
    "message": "Order updated successfully",
    "matched": matched,
  })))
}
