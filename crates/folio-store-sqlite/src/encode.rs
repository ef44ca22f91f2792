//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! fraction and a `Z` suffix, so that lexical order in SQL equals
//! chronological order. Ids are stored as lowercase hex. Tag lists are
//! compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use folio_core::{
  ObjectId,
  account::Account,
  contact::ContactMessage,
  project::Project,
};

use crate::{Error, Result};

// ─── ObjectId ────────────────────────────────────────────────────────────────

pub fn encode_id(id: ObjectId) -> String { id.to_string() }

pub fn decode_id(s: &str) -> Result<ObjectId> { Ok(s.parse()?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ACCOUNT_COLUMNS: &str =
  "account_id, name, email, password_hash, created_at";

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:            decode_id(&self.account_id)?,
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const PROJECT_COLUMNS: &str = "project_id, title, description, \
  long_description, image_url, category, tags, featured, sort_order, \
  created_at, updated_at";

/// Raw values read directly from a `projects` row.
pub struct RawProject {
  pub project_id:       String,
  pub title:            String,
  pub description:      String,
  pub long_description: Option<String>,
  pub image_url:        String,
  pub category:         String,
  pub tags:             String,
  pub featured:         bool,
  pub sort_order:       i64,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawProject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      project_id:       row.get(0)?,
      title:            row.get(1)?,
      description:      row.get(2)?,
      long_description: row.get(3)?,
      image_url:        row.get(4)?,
      category:         row.get(5)?,
      tags:             row.get(6)?,
      featured:         row.get(7)?,
      sort_order:       row.get(8)?,
      created_at:       row.get(9)?,
      updated_at:       row.get(10)?,
    })
  }

  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      id:               decode_id(&self.project_id)?,
      title:            self.title,
      description:      self.description,
      long_description: self.long_description,
      image_url:        self.image_url,
      category:         self.category,
      tags:             decode_tags(&self.tags)?,
      featured:         self.featured,
      order:            self.sort_order,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub const CONTACT_COLUMNS: &str =
  "contact_id, name, email, message, read, created_at, updated_at";

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub contact_id: String,
  pub name:       String,
  pub email:      String,
  pub message:    String,
  pub read:       bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id: row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      message:    row.get(3)?,
      read:       row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_contact(self) -> Result<ContactMessage> {
    Ok(ContactMessage {
      id:         decode_id(&self.contact_id)?,
      name:       self.name,
      email:      self.email,
      message:    self.message,
      read:       self.read,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let earlier = encode_dt(base + Duration::milliseconds(500));
    let later = encode_dt(base + Duration::milliseconds(1450));
    assert!(earlier < later, "{earlier} vs {later}");
    assert_eq!(earlier.len(), later.len());
    assert_eq!(decode_dt(&earlier).unwrap(), base + Duration::milliseconds(500));
  }
}
