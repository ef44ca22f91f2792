//! Admin accounts.
//!
//! Accounts are provisioned out of band and are only ever read by the login
//! flow. The display name is the login key.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ObjectId, Result, validate};

/// A stored account, including its password hash. Never serialised.
#[derive(Clone)]
pub struct Account {
  pub id:            ObjectId,
  /// Unique, trimmed, matched case-sensitively at login.
  pub name:          String,
  pub email:         String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`.
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl Account {
  /// The fields that may leave the server.
  pub fn view(&self) -> AccountView {
    AccountView {
      id:    self.id,
      email: self.email.clone(),
      name:  self.name.clone(),
    }
  }
}

impl fmt::Debug for Account {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Account")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("email", &self.email)
      .field("password_hash", &"<redacted>")
      .field("created_at", &self.created_at)
      .finish()
  }
}

/// Public projection of an [`Account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
  pub id:    ObjectId,
  pub email: String,
  pub name:  String,
}

/// Input to [`crate::store::PortfolioStore::create_account`].
#[derive(Clone)]
pub struct NewAccount {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
}

impl NewAccount {
  /// Trim the name, normalise the email to lower case.
  pub fn validate(self) -> Result<Self> {
    Ok(Self {
      name:          validate::required("name", &self.name)?,
      email:         validate::email("email", &self.email)?.to_lowercase(),
      password_hash: validate::required("password hash", &self.password_hash)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_hides_password_hash() {
    let account = Account {
      id:            "000000000000000000000001".parse().unwrap(),
      name:          "Admin User".into(),
      email:         "admin@example.com".into(),
      password_hash: "$argon2id$secret".into(),
      created_at:    Utc::now(),
    };
    let printed = format!("{account:?}");
    assert!(!printed.contains("secret"));
    assert!(printed.contains("Admin User"));
  }

  #[test]
  fn new_account_is_normalised() {
    let account = NewAccount {
      name:          "  Admin User ".into(),
      email:         " Admin@Example.COM ".into(),
      password_hash: "hash".into(),
    }
    .validate()
    .unwrap();
    assert_eq!(account.name, "Admin User");
    assert_eq!(account.email, "admin@example.com");
  }
}
