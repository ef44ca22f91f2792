//! The session gate in front of the admin pages.
//!
//! Every request whose path is `/admin` or lies under `/admin/` is checked
//! before routing, so unknown admin paths are covered too. API routes carry
//! their own check ([`folio_api::session::AdminSession`]) and answer 401
//! instead of redirecting.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use folio_api::session::{TokenIssuer, TokenState, removal_cookie};

pub const ADMIN_ROOT: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
  /// Not an admin path, or a valid session: hand the request on.
  Proceed,
  /// Serve the login page, dropping a stale cookie first if asked.
  ShowLogin { clear_cookie: bool },
  /// A signed-in user asked for the login page.
  RedirectToAdmin,
  RedirectToLogin { clear_cookie: bool },
}

pub fn is_protected(path: &str) -> bool {
  path == ADMIN_ROOT || path.starts_with("/admin/")
}

pub fn is_login(path: &str) -> bool {
  path.strip_suffix('/').unwrap_or(path) == LOGIN_PATH
}

pub fn decide(path: &str, token: TokenState) -> GateDecision {
  if !is_protected(path) {
    return GateDecision::Proceed;
  }
  match (is_login(path), token) {
    (true, TokenState::Valid(_)) => GateDecision::RedirectToAdmin,
    (true, TokenState::Missing) => GateDecision::ShowLogin { clear_cookie: false },
    (true, TokenState::Invalid) => GateDecision::ShowLogin { clear_cookie: true },
    (false, TokenState::Valid(_)) => GateDecision::Proceed,
    (false, TokenState::Missing) => GateDecision::RedirectToLogin { clear_cookie: false },
    (false, TokenState::Invalid) => GateDecision::RedirectToLogin { clear_cookie: true },
  }
}

/// Middleware running [`decide`] on every request.
pub async fn enforce(
  State(tokens): State<Arc<TokenIssuer>>,
  jar: CookieJar,
  req: Request,
  next: Next,
) -> Response {
  let path = req.uri().path();
  if !is_protected(path) {
    return next.run(req).await;
  }

  let decision = decide(path, tokens.inspect(&jar));
  tracing::debug!(path, ?decision, "admin gate");
  match decision {
    GateDecision::Proceed => next.run(req).await,
    GateDecision::ShowLogin { clear_cookie } => {
      let page = next.run(req).await;
      if clear_cookie {
        (jar.add(removal_cookie()), page).into_response()
      } else {
        page
      }
    }
    GateDecision::RedirectToAdmin => Redirect::to(ADMIN_ROOT).into_response(),
    GateDecision::RedirectToLogin { clear_cookie } => {
      let redirect = Redirect::to(LOGIN_PATH);
      if clear_cookie {
        (jar.add(removal_cookie()), redirect).into_response()
      } else {
        redirect.into_response()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use folio_core::ObjectId;

  use super::*;

  fn valid() -> TokenState { TokenState::Valid(ObjectId::from_bytes([7; 12])) }

  #[test]
  fn prefix_matching() {
    assert!(is_protected("/admin"));
    assert!(is_protected("/admin/"));
    assert!(is_protected("/admin/projects"));
    assert!(is_protected("/admin/anything/else"));
    assert!(!is_protected("/administrator"));
    assert!(!is_protected("/api/projects"));
    assert!(!is_protected("/"));
  }

  #[test]
  fn login_path_tolerates_trailing_slash() {
    assert!(is_login("/admin/login"));
    assert!(is_login("/admin/login/"));
    assert!(!is_login("/admin/login/extra"));
    assert!(!is_login("/admin"));
  }

  #[test]
  fn public_paths_always_proceed() {
    for token in [TokenState::Missing, TokenState::Invalid, valid()] {
      assert_eq!(decide("/api/projects", token), GateDecision::Proceed);
      assert_eq!(decide("/health", token), GateDecision::Proceed);
    }
  }

  #[test]
  fn protected_page_decisions() {
    assert_eq!(
      decide("/admin/projects", TokenState::Missing),
      GateDecision::RedirectToLogin { clear_cookie: false }
    );
    assert_eq!(
      decide("/admin/projects", TokenState::Invalid),
      GateDecision::RedirectToLogin { clear_cookie: true }
    );
    assert_eq!(decide("/admin/projects", valid()), GateDecision::Proceed);
    assert_eq!(decide("/admin", valid()), GateDecision::Proceed);
  }

  #[test]
  fn login_page_decisions() {
    assert_eq!(decide("/admin/login", valid()), GateDecision::RedirectToAdmin);
    assert_eq!(
      decide("/admin/login", TokenState::Missing),
      GateDecision::ShowLogin { clear_cookie: false }
    );
    assert_eq!(
      decide("/admin/login/", TokenState::Invalid),
      GateDecision::ShowLogin { clear_cookie: true }
    );
  }
}
