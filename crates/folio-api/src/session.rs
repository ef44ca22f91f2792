//! Session tokens, the `auth-token` cookie, and the [`AdminSession`]
//! extractor.
//!
//! A session is an HS256 JWT whose subject is the account id. The cookie is
//! the only credential the server reads; the copy returned in the login body
//! is for the client's convenience.

use std::sync::Arc;

use axum::{
  extract::FromRequestParts,
  http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use folio_core::{
  ObjectId,
  clock::{Clock, SystemClock},
  store::PortfolioStore,
};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ApiState, error::ApiError};

pub const AUTH_COOKIE: &str = "auth-token";

/// Seven days, in seconds. Also the cookie `Max-Age`.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  #[serde(default)]
  sub: String,
  iat: i64,
  exp: i64,
}

/// Why a token was refused. Only ever logged; callers treat every variant
/// the same.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
  #[error("token is malformed")]
  Malformed,
  #[error("token signature does not verify")]
  BadSignature,
  #[error("token has no usable subject")]
  MissingSubject,
  #[error("token expired")]
  Expired,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with a secret fixed at construction.
pub struct TokenIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
  clock:    Arc<dyn Clock>,
}

impl TokenIssuer {
  pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl,
      clock,
    }
  }

  /// Seven-day tokens against the wall clock.
  pub fn from_secret(secret: &[u8]) -> Self {
    Self::new(
      secret,
      Duration::seconds(SESSION_TTL_SECS),
      Arc::new(SystemClock),
    )
  }

  pub fn issue(&self, subject: ObjectId) -> Result<IssuedToken, ApiError> {
    let now = self.clock.now();
    let expires_at = now + self.ttl;
    let claims = Claims {
      sub: subject.to_string(),
      iat: now.timestamp(),
      exp: expires_at.timestamp(),
    };
    let token = jsonwebtoken::encode(
      &Header::new(Algorithm::HS256),
      &claims,
      &self.encoding,
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))?;
    Ok(IssuedToken { token, expires_at })
  }

  /// Return the account id a token was issued for.
  pub fn verify(&self, token: &str) -> Result<ObjectId, TokenError> {
    // Expiry is checked below against our own clock.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp"]);

    let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
      .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        _ => TokenError::Malformed,
      })?
      .claims;

    if claims.sub.is_empty() {
      return Err(TokenError::MissingSubject);
    }
    let subject: ObjectId = claims
      .sub
      .parse()
      .map_err(|_| TokenError::MissingSubject)?;

    if claims.exp <= self.clock.now().timestamp() {
      return Err(TokenError::Expired);
    }
    Ok(subject)
  }

  /// Classify the session cookie carried by a request.
  pub fn inspect(&self, jar: &CookieJar) -> TokenState {
    let Some(cookie) = jar.get(AUTH_COOKIE) else {
      return TokenState::Missing;
    };
    match self.verify(cookie.value()) {
      Ok(id) => TokenState::Valid(id),
      Err(reason) => {
        tracing::debug!(%reason, "rejected session cookie");
        TokenState::Invalid
      }
    }
  }
}

/// What a request's session cookie amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
  Missing,
  Invalid,
  Valid(ObjectId),
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
  Cookie::build((AUTH_COOKIE, token))
    .http_only(true)
    .secure(secure)
    .same_site(SameSite::Lax)
    .path("/")
    .max_age(time::Duration::seconds(SESSION_TTL_SECS))
    .build()
}

/// A cookie that makes the browser drop `auth-token`.
///
/// Added to the jar rather than passed to `CookieJar::remove`, so the header
/// is sent even when the request carried no cookie.
pub fn removal_cookie() -> Cookie<'static> {
  Cookie::build((AUTH_COOKIE, ""))
    .http_only(true)
    .same_site(SameSite::Lax)
    .path("/")
    .max_age(time::Duration::ZERO)
    .expires(time::OffsetDateTime::UNIX_EPOCH)
    .build()
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the request carried a valid
/// session cookie.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
  pub account_id: ObjectId,
}

impl<S> FromRequestParts<ApiState<S>> for AdminSession
where
  S: PortfolioStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    match state.tokens.inspect(&jar) {
      TokenState::Valid(account_id) => Ok(AdminSession { account_id }),
      TokenState::Missing | TokenState::Invalid => {
        Err(ApiError::Unauthorized("Unauthorized"))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::http::{HeaderMap, HeaderValue, header};
  use chrono::TimeZone;
  use folio_core::clock::ManualClock;

  use super::*;

  fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()))
  }

  fn issuer(clock: Arc<ManualClock>) -> TokenIssuer {
    TokenIssuer::new(b"test-secret", Duration::seconds(SESSION_TTL_SECS), clock)
  }

  fn account() -> ObjectId { "65a1b2c3d4e5f60718293a4b".parse().unwrap() }

  #[test]
  fn issued_token_verifies_to_subject() {
    let tokens = issuer(clock());
    let issued = tokens.issue(account()).unwrap();
    assert_eq!(tokens.verify(&issued.token), Ok(account()));
  }

  #[test]
  fn token_expires_after_seven_days() {
    let clock = clock();
    let tokens = issuer(clock.clone());
    let issued = tokens.issue(account()).unwrap();

    clock.advance(Duration::days(7) - Duration::seconds(1));
    assert!(tokens.verify(&issued.token).is_ok());

    clock.advance(Duration::seconds(1));
    assert_eq!(tokens.verify(&issued.token), Err(TokenError::Expired));
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let clock = clock();
    let ours = issuer(clock.clone());
    let theirs = TokenIssuer::new(b"other-secret", Duration::days(7), clock);
    let forged = theirs.issue(account()).unwrap();
    assert_eq!(ours.verify(&forged.token), Err(TokenError::BadSignature));
  }

  #[test]
  fn garbage_is_malformed() {
    let tokens = issuer(clock());
    for input in ["", "abc", "a.b.c", "....", "\u{1F600}.x.y"] {
      assert_eq!(tokens.verify(input), Err(TokenError::Malformed), "{input:?}");
    }
  }

  #[test]
  fn empty_subject_is_rejected() {
    let clock = clock();
    let now = clock.now().timestamp();
    let claims = Claims { sub: String::new(), iat: now, exp: now + 60 };
    let token = jsonwebtoken::encode(
      &Header::new(Algorithm::HS256),
      &claims,
      &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();
    assert_eq!(issuer(clock).verify(&token), Err(TokenError::MissingSubject));
  }

  #[test]
  fn inspect_classifies_cookies() {
    let tokens = issuer(clock());
    assert_eq!(tokens.inspect(&CookieJar::new()), TokenState::Missing);

    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("auth-token=nope"));
    assert_eq!(tokens.inspect(&CookieJar::from_headers(&headers)), TokenState::Invalid);

    let issued = tokens.issue(account()).unwrap();
    let jar = CookieJar::new().add(session_cookie(issued.token, false));
    assert_eq!(tokens.inspect(&jar), TokenState::Valid(account()));
  }

  #[test]
  fn session_cookie_attributes() {
    let rendered = session_cookie("t".into(), true).to_string();
    assert!(rendered.starts_with("auth-token=t"));
    assert!(rendered.contains("HttpOnly"));
    assert!(rendered.contains("SameSite=Lax"));
    assert!(rendered.contains("Secure"));
    assert!(rendered.contains("Path=/"));
    assert!(rendered.contains("Max-Age=604800"));

    assert!(!session_cookie("t".into(), false).to_string().contains("Secure"));
  }

  #[test]
  fn removal_cookie_expires_immediately() {
    let rendered = removal_cookie().to_string();
    assert!(rendered.starts_with("auth-token=;"));
    assert!(rendered.contains("Max-Age=0"));
  }
}
