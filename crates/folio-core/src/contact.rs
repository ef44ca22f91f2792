//! Contact-form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ObjectId, Result, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
  pub id:         ObjectId,
  pub name:       String,
  pub email:      String,
  pub message:    String,
  pub read:       bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewContactMessage {
  pub name:    String,
  pub email:   String,
  pub message: String,
}

impl NewContactMessage {
  pub fn validate(self) -> Result<Self> {
    Ok(Self {
      name:    validate::required("name", &self.name)?,
      email:   validate::email("email", &self.email)?,
      message: validate::required("message", &self.message)?,
    })
  }

  pub fn into_message(self, id: ObjectId, now: DateTime<Utc>) -> ContactMessage {
    ContactMessage {
      id,
      name: self.name,
      email: self.email,
      message: self.message,
      read: false,
      created_at: now,
      updated_at: now,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactPatch {
  pub name:    Option<String>,
  pub email:   Option<String>,
  pub message: Option<String>,
  pub read:    Option<bool>,
}

impl ContactPatch {
  pub fn validate(self) -> Result<Self> {
    Ok(Self {
      name:    self.name.map(|v| validate::required("name", &v)).transpose()?,
      email:   self.email.map(|v| validate::email("email", &v)).transpose()?,
      message: self
        .message
        .map(|v| validate::required("message", &v))
        .transpose()?,
      read:    self.read,
    })
  }

  pub fn apply(self, message: &mut ContactMessage, now: DateTime<Utc>) {
    if let Some(name) = self.name {
      message.name = name;
    }
    if let Some(email) = self.email {
      message.email = email;
    }
    if let Some(body) = self.message {
      message.message = body;
    }
    if let Some(read) = self.read {
      message.read = read;
    }
    message.updated_at = now;
  }
}
