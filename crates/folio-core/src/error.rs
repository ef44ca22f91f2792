//! Error types for `folio-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An identifier that is not a 24-character hexadecimal string.
  #[error("invalid id format: {0:?}")]
  InvalidId(String),

  /// A field failed validation; the message is safe to show to clients.
  #[error("{0}")]
  Validation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
