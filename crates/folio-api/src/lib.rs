//! JSON REST API for folio.
//!
//! Exposes an axum [`Router`] backed by any
//! [`folio_core::store::PortfolioStore`]. Mutating endpoints require the
//! `auth-token` session cookie (see [`session::AdminSession`]); reads of the
//! public site content do not.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", folio_api::api_router(state))
//! ```

pub mod about;
pub mod auth;
pub mod contacts;
pub mod error;
pub mod media;
pub mod projects;
pub mod session;
pub mod upload;

use std::sync::Arc;

use axum::{
  Router,
  extract::{DefaultBodyLimit, FromRequest},
  routing::{get, post, put},
};
use folio_core::{clock::Clock, store::PortfolioStore};

pub use error::ApiError;
use media::MediaHost;
use session::TokenIssuer;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub tokens:   Arc<TokenIssuer>,
  /// `None` when no media host is configured; uploads then fail with 500.
  pub media:    Option<Arc<dyn MediaHost>>,
  pub clock:    Arc<dyn Clock>,
  pub settings: Arc<ApiSettings>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      tokens:   self.tokens.clone(),
      media:    self.media.clone(),
      clock:    self.clock.clone(),
      settings: self.settings.clone(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
  /// Mark the session cookie `Secure`.
  pub cookie_secure:       bool,
  /// Image URLs outside these hosts are accepted but logged.
  pub trusted_media_hosts: Vec<String>,
}

// ─── JSON bodies ─────────────────────────────────────────────────────────────

/// `axum::Json`, but a body that fails to parse is a 400 with the usual
/// `{"error": ..}` shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PortfolioStore + 'static,
{
  Router::new()
    // Auth
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/logout", post(auth::logout))
    .route("/auth/me", get(auth::me::<S>))
    // Projects
    .route("/projects", get(projects::list::<S>).post(projects::create::<S>))
    .route("/projects/reorder", put(projects::reorder::<S>))
    .route(
      "/projects/{id}",
      get(projects::get_one::<S>)
        .put(projects::update::<S>)
        .delete(projects::delete_one::<S>),
    )
    // Contact messages
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    .route(
      "/contacts/{id}",
      put(contacts::update::<S>).delete(contacts::delete_one::<S>),
    )
    // About
    .route("/about", get(about::get::<S>).put(about::update::<S>))
    // Upload
    .route(
      "/upload",
      post(upload::handler::<S>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
    .with_state(state)
}
