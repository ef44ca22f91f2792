//! Handlers for `/auth` endpoints, plus the password hashing helpers the
//! provisioning command shares with them.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login`  | Body: `{"name":"..","password":".."}`; sets the session cookie |
//! | `POST` | `/auth/logout` | Always succeeds; clears the session cookie |
//! | `GET`  | `/auth/me`     | The account behind the session cookie |

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::State,
  response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use folio_core::{account::AccountView, store::PortfolioStore};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  ApiState, JsonBody,
  error::ApiError,
  session::{TokenState, removal_cookie, session_cookie},
};

const BAD_CREDENTIALS: &str = "Invalid username or password";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// `false` for a wrong password and for an unparseable stored hash alike.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    tracing::warn!("stored password hash is not a valid PHC string");
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub name:     String,
  #[serde(default)]
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  AccountView,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<ApiState<S>>,
  jar: CookieJar,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError>
where
  S: PortfolioStore,
{
  let name = body.name.trim();
  if name.is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest(
      "Username and password are required".to_owned(),
    ));
  }

  let account = state
    .store
    .find_account_by_name(name)
    .await
    .map_err(ApiError::store)?;

  let Some(account) = account else {
    tracing::warn!(name, "login for unknown account");
    return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
  };
  if !verify_password(&body.password, &account.password_hash) {
    tracing::warn!(name, "login with wrong password");
    return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
  }

  let issued = state.tokens.issue(account.id)?;
  tracing::info!(account = %account.id, "login succeeded");

  let jar = jar.add(session_cookie(
    issued.token.clone(),
    state.settings.cookie_secure,
  ));
  Ok((jar, Json(LoginResponse { token: issued.token, user: account.view() })))
}

// ─── Logout ──────────────────────────────────────────────────────────────────

/// `POST /auth/logout`
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
  (
    jar.add(removal_cookie()),
    Json(json!({ "message": "Logged out successfully" })),
  )
}

// ─── Me ──────────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me<S>(
  State(state): State<ApiState<S>>,
  jar: CookieJar,
) -> Result<Response, ApiError>
where
  S: PortfolioStore,
{
  let account_id = match state.tokens.inspect(&jar) {
    TokenState::Valid(id) => id,
    TokenState::Missing => return Err(ApiError::Unauthorized("Not authenticated")),
    TokenState::Invalid => return Ok(invalid_token(jar)),
  };

  let account = state
    .store
    .get_account(account_id)
    .await
    .map_err(ApiError::store)?;

  match account {
    Some(account) => Ok(Json(account.view()).into_response()),
    None => {
      tracing::debug!(account = %account_id, "session for deleted account");
      Ok(invalid_token(jar))
    }
  }
}

fn invalid_token(jar: CookieJar) -> Response {
  (jar.add(removal_cookie()), ApiError::Unauthorized("Invalid token")).into_response()
}

#[cfg(test)]
mod tests {
  use axum::http::{StatusCode, header};
  use serde_json::json;

  use crate::test_support::{NAME, PASSWORD, harness, json};

  fn set_cookie(resp: &axum::response::Response) -> Option<String> {
    resp
      .headers()
      .get(header::SET_COOKIE)
      .map(|v| v.to_str().unwrap().to_owned())
  }

  #[test]
  fn hash_then_verify() {
    let hash = super::hash_password("hunter2").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(super::verify_password("hunter2", &hash));
    assert!(!super::verify_password("hunter3", &hash));
    assert!(!super::verify_password("hunter2", "not-a-phc-string"));
  }

  #[tokio::test]
  async fn login_success_sets_cookie_and_returns_user() {
    let h = harness().await;
    let resp = h
      .send(
        "POST",
        "/auth/login",
        None,
        Some(json!({ "name": format!("  {NAME} "), "password": PASSWORD })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = set_cookie(&resp).expect("session cookie");
    assert!(cookie.starts_with("auth-token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));

    let body = json(resp).await;
    let token = body["token"].as_str().unwrap();
    assert_eq!(h.state.tokens.verify(token).unwrap(), h.account);
    assert_eq!(body["user"]["name"], NAME);
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert_eq!(body["user"]["id"], h.account.to_string());
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password").is_none());
  }

  #[tokio::test]
  async fn wrong_password_is_401_without_cookie() {
    let h = harness().await;
    let resp = h
      .send(
        "POST",
        "/auth/login",
        None,
        Some(json!({ "name": NAME, "password": "wrong" })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&resp).is_none());
    assert_eq!(json(resp).await["error"], "Invalid username or password");
  }

  #[tokio::test]
  async fn unknown_name_gets_the_same_401() {
    let h = harness().await;
    let resp = h
      .send(
        "POST",
        "/auth/login",
        None,
        Some(json!({ "name": "nobody", "password": PASSWORD })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(resp).await["error"], "Invalid username or password");
  }

  #[tokio::test]
  async fn missing_fields_are_400() {
    let h = harness().await;
    for body in [json!({}), json!({ "name": "  ", "password": "x" }), json!({ "name": NAME })] {
      let resp = h.send("POST", "/auth/login", None, Some(body)).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
  }

  #[tokio::test]
  async fn malformed_json_is_400() {
    let h = harness().await;
    let req = axum::http::Request::builder()
      .method("POST")
      .uri("/auth/login")
      .header(header::CONTENT_TYPE, "application/json")
      .body(axum::body::Body::from("{not json"))
      .unwrap();
    let resp = tower::ServiceExt::oneshot(crate::api_router(h.state.clone()), req)
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn logout_clears_cookie() {
    let h = harness().await;
    let resp = h.send("POST", "/auth/logout", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = set_cookie(&resp).unwrap();
    assert!(cookie.starts_with("auth-token=;"));
    assert!(cookie.contains("Max-Age=0"));
  }

  #[tokio::test]
  async fn me_reports_session_state() {
    let h = harness().await;

    let resp = h.send("GET", "/auth/me", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(resp).await["error"], "Not authenticated");

    let resp = h.send("GET", "/auth/me", Some("auth-token=garbage"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&resp).unwrap().contains("Max-Age=0"));
    assert_eq!(json(resp).await["error"], "Invalid token");

    let resp = h.send_admin("GET", "/auth/me", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["name"], NAME);
  }
}
