//! HTTP server for folio.
//!
//! Composes the JSON API under `/api`, the admin page shells under `/admin`
//! behind the session gate, and a health check.

pub mod gate;
pub mod pages;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Router,
  http::StatusCode,
  middleware,
  routing::get,
};
use folio_api::{ApiState, media::CloudinaryConfig};
use folio_core::store::PortfolioStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FOLIO_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  pub store_path:          PathBuf,
  /// HMAC key for session tokens.
  pub jwt_secret:          String,
  #[serde(default)]
  pub cookie_secure:       bool,
  #[serde(default = "default_trusted_media_hosts")]
  pub trusted_media_hosts: Vec<String>,
  /// Cloudinary credentials; uploads fail while unset.
  #[serde(default)]
  pub media:               Option<CloudinaryConfig>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_trusted_media_hosts() -> Vec<String> {
  vec!["res.cloudinary.com".to_owned(), "via.placeholder.com".to_owned()]
}

/// Read `path` (if it exists), then overlay `FOLIO_*` environment variables.
/// Nested keys use a double underscore, e.g. `FOLIO_MEDIA__CLOUD_NAME`.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("FOLIO")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("trusted_media_hosts")
        .try_parsing(true),
    )
    .build()?
    .try_deserialize()
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> &'static str { "ok" }

async fn not_found() -> StatusCode { StatusCode::NOT_FOUND }

/// Build the full application router.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: PortfolioStore + 'static,
{
  let tokens = state.tokens.clone();
  Router::new()
    .route("/health", get(health))
    .route("/admin", get(pages::dashboard))
    .route("/admin/", get(pages::dashboard))
    .route("/admin/login", get(pages::login))
    .route("/admin/login/", get(pages::login))
    .route("/admin/projects", get(pages::projects))
    .route("/admin/contacts", get(pages::contacts))
    .route("/admin/about", get(pages::about))
    .nest("/api", folio_api::api_router(state))
    .fallback(not_found)
    .layer(middleware::from_fn_with_state(tokens, gate::enforce))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, Response, header},
  };
  use chrono::{Duration, TimeZone, Utc};
  use folio_api::{
    ApiSettings,
    auth::hash_password,
    session::{SESSION_TTL_SECS, TokenIssuer},
  };
  use folio_core::{account::NewAccount, clock::ManualClock};
  use folio_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  struct App {
    state: ApiState<SqliteStore>,
    clock: Arc<ManualClock>,
  }

  async fn app() -> App {
    let clock = Arc::new(ManualClock::new(
      Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
    ));
    let store = SqliteStore::open_in_memory()
      .await
      .unwrap()
      .with_clock(clock.clone());
    store
      .create_account(NewAccount {
        name:          "Admin User".into(),
        email:         "admin@example.com".into(),
        password_hash: hash_password("secret").unwrap(),
      })
      .await
      .unwrap();

    let tokens = TokenIssuer::new(
      b"test-secret",
      Duration::seconds(SESSION_TTL_SECS),
      clock.clone(),
    );
    App {
      state: ApiState {
        store:    Arc::new(store),
        tokens:   Arc::new(tokens),
        media:    None,
        clock:    clock.clone(),
        settings: Arc::new(ApiSettings::default()),
      },
      clock,
    }
  }

  impl App {
    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
      let mut req = Request::builder().uri(uri);
      if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
      }
      router(self.state.clone())
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap()
    }

    /// Log in through the API and return the `name=value` cookie pair.
    async fn login(&self) -> String {
      let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Admin User","password":"secret"}"#))
        .unwrap();
      let resp = router(self.state.clone()).oneshot(req).await.unwrap();
      assert_eq!(resp.status(), StatusCode::OK);
      let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
      set_cookie.split(';').next().unwrap().to_owned()
    }
  }

  fn location(resp: &Response<Body>) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
  }

  fn clears_cookie(resp: &Response<Body>) -> bool {
    resp
      .headers()
      .get_all(header::SET_COOKIE)
      .iter()
      .any(|v| {
        let v = v.to_str().unwrap();
        v.starts_with("auth-token=;") && v.contains("Max-Age=0")
      })
  }

  #[test]
  fn config_file_with_defaults() {
    let path = std::env::temp_dir().join(format!(
      "folio-config-{}.toml",
      std::process::id()
    ));
    std::fs::write(
      &path,
      "store_path = \"/tmp/folio.db\"\njwt_secret = \"s3cret\"\n\n[media]\ncloud_name = \"demo\"\napi_key = \"k\"\napi_secret = \"s\"\n",
    )
    .unwrap();
    let cfg = load_config(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.jwt_secret, "s3cret");
    assert!(!cfg.cookie_secure);
    assert!(cfg.trusted_media_hosts.contains(&"res.cloudinary.com".to_owned()));
    let media = cfg.media.unwrap();
    assert_eq!(media.cloud_name, "demo");
    assert_eq!(media.folder, None);
  }

  #[tokio::test]
  async fn health_is_open() {
    let app = app().await;
    let resp = app.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn admin_without_cookie_redirects_to_login() {
    let app = app().await;
    let resp = app.get("/admin/projects", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login");
    assert!(!clears_cookie(&resp));
  }

  #[tokio::test]
  async fn unknown_admin_paths_are_gated() {
    let app = app().await;
    let resp = app.get("/admin/does-not-exist", None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let cookie = app.login().await;
    let resp = app.get("/admin/does-not-exist", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn login_then_admin_pages_render() {
    let app = app().await;
    let cookie = app.login().await;
    for page in ["/admin", "/admin/projects", "/admin/contacts", "/admin/about"] {
      let resp = app.get(page, Some(&cookie)).await;
      assert_eq!(resp.status(), StatusCode::OK, "{page}");
    }
  }

  #[tokio::test]
  async fn expired_cookie_redirects_and_clears() {
    let app = app().await;
    let cookie = app.login().await;
    app.clock.advance(Duration::days(8));

    let resp = app.get("/admin/projects", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login");
    assert!(clears_cookie(&resp));
  }

  #[tokio::test]
  async fn forged_cookie_redirects_and_clears() {
    let app = app().await;
    let resp = app.get("/admin", Some("auth-token=eyJhbGciOiJIUzI1NiJ9.e30.x")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(clears_cookie(&resp));
  }

  #[tokio::test]
  async fn login_page_for_signed_in_user_redirects_to_admin() {
    let app = app().await;
    let cookie = app.login().await;
    let resp = app.get("/admin/login", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");
  }

  #[tokio::test]
  async fn login_page_is_served_and_clears_stale_cookie() {
    let app = app().await;
    let resp = app.get("/admin/login", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.get("/admin/login/", Some("auth-token=stale")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(clears_cookie(&resp));
  }

  #[tokio::test]
  async fn public_api_is_not_gated() {
    let app = app().await;
    let resp = app.get("/api/projects", Some("auth-token=stale")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!clears_cookie(&resp));
  }
}
