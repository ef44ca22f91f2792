//! Field-level validation helpers shared by the record types.

use crate::{Error, Result};

/// Trim `value` and reject it if nothing is left.
pub fn required(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  Ok(trimmed.to_owned())
}

/// Trim an optional value; blank becomes `None`.
pub fn optional(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// Trim every entry and drop blanks.
pub fn string_list(values: Vec<String>) -> Vec<String> {
  values
    .into_iter()
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
    .collect()
}

/// A required email-ish value: trimmed, non-empty, with a local part and a
/// domain around a single `@`.
pub fn email(field: &str, value: &str) -> Result<String> {
  let value = required(field, value)?;
  match value.split_once('@') {
    Some((local, domain))
      if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
    {
      Ok(value)
    }
    _ => Err(Error::Validation(format!("{field} must be an email address"))),
  }
}

/// A required URL: either an absolute `http`/`https` URL with a host, or a
/// root-relative path such as `/cv/resume.pdf`.
pub fn url(field: &str, value: &str) -> Result<String> {
  let value = required(field, value)?;
  if value.chars().any(char::is_whitespace) {
    return Err(Error::Validation(format!("{field} must be a valid URL")));
  }
  if value.starts_with('/') && !value.starts_with("//") {
    return Ok(value);
  }
  match url_host(&value) {
    Some(host) if !host.is_empty() => Ok(value),
    _ => Err(Error::Validation(format!("{field} must be a valid URL"))),
  }
}

/// The lower-cased host of an absolute `http`/`https` URL, if it has one.
pub fn url_host(value: &str) -> Option<String> {
  let (scheme, rest) = value.split_once("://")?;
  if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
    return None;
  }
  let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
  let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
  let host = host_port.split(':').next().unwrap_or_default();
  if host.is_empty() {
    None
  } else {
    Some(host.to_ascii_lowercase())
  }
}
