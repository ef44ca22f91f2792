//! Error type for `folio-store-sqlite`.

use folio_core::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] folio_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("an account named {0:?} already exists")]
  DuplicateAccount(String),

  #[error("project {0} already exists")]
  DuplicateProject(ObjectId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
