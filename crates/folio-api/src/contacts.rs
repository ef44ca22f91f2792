//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/contacts` | Public contact form |
//! | `GET`    | `/contacts` | Newest first; session required |
//! | `PUT`    | `/contacts/:id` | Partial update, e.g. `{"read":true}` |
//! | `DELETE` | `/contacts/:id` | Session required |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  ObjectId,
  contact::{ContactMessage, ContactPatch, NewContactMessage},
  store::PortfolioStore,
};
use serde_json::{Value, json};

use crate::{ApiState, JsonBody, error::ApiError, session::AdminSession};

const NOT_FOUND: &str = "Contact not found";

fn parse_id(raw: &str) -> Result<ObjectId, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest("Invalid contact ID format".to_owned()))
}

/// `GET /contacts`
pub async fn list<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<ContactMessage>>, ApiError>
where
  S: PortfolioStore,
{
  let messages = state.store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(messages))
}

/// `POST /contacts`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NewContactMessage>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortfolioStore,
{
  let input = body.validate()?;
  let message = state
    .store
    .create_contact(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(contact = %message.id, "received contact message");
  Ok((StatusCode::CREATED, Json(message)))
}

/// `PUT /contacts/:id`
pub async fn update<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<ContactPatch>,
) -> Result<Json<ContactMessage>, ApiError>
where
  S: PortfolioStore,
{
  let id = parse_id(&id)?;
  let patch = body.validate()?;
  let message = state
    .store
    .update_contact(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(NOT_FOUND))?;
  Ok(Json(message))
}

/// `DELETE /contacts/:id`
pub async fn delete_one<S>(
  _session: AdminSession,
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: PortfolioStore,
{
  let id = parse_id(&id)?;
  if !state.store.delete_contact(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(NOT_FOUND));
  }
  Ok(Json(json!({})))
}
