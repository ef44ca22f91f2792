//! Record identifiers.
//!
//! Every persisted record is keyed by an [`ObjectId`]: 12 bytes rendered as a
//! 24-character lowercase hex string. The first four bytes are the big-endian
//! unix timestamp (seconds) of generation, the remaining eight are random.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// Length of the textual form of an [`ObjectId`].
pub const OBJECT_ID_HEX_LEN: usize = 24;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
  pub const fn from_bytes(bytes: [u8; 12]) -> Self { Self(bytes) }

  pub const fn as_bytes(&self) -> &[u8; 12] { &self.0 }

  /// Generate a fresh id stamped with `at`.
  pub fn generate(at: DateTime<Utc>) -> Self {
    let mut bytes = [0u8; 12];
    let secs = u32::try_from(at.timestamp()).unwrap_or(0);
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    OsRng.fill_bytes(&mut bytes[4..]);
    Self(bytes)
  }

  /// Returns true if `s` has the shape of an id (24 hex characters).
  pub fn is_valid(s: &str) -> bool {
    s.len() == OBJECT_ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
  }
}

impl FromStr for ObjectId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if !Self::is_valid(s) {
      return Err(Error::InvalidId(s.to_owned()));
    }
    let mut bytes = [0u8; 12];
    hex::decode_to_slice(s, &mut bytes)
      .map_err(|_| Error::InvalidId(s.to_owned()))?;
    Ok(Self(bytes))
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&hex::encode(self.0))
  }
}

impl fmt::Debug for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ObjectId({self})")
  }
}

impl Serialize for ObjectId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for ObjectId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn parses_and_prints_lowercase() {
    let id: ObjectId = "65A1B2C3D4E5F60718293A4B".parse().unwrap();
    assert_eq!(id.to_string(), "65a1b2c3d4e5f60718293a4b");
  }

  #[test]
  fn rejects_wrong_length_and_non_hex() {
    assert!("123".parse::<ObjectId>().is_err());
    assert!("zzzzzzzzzzzzzzzzzzzzzzzz".parse::<ObjectId>().is_err());
    assert!("65a1b2c3d4e5f60718293a4b0".parse::<ObjectId>().is_err());
    assert!("".parse::<ObjectId>().is_err());
  }

  #[test]
  fn generated_ids_carry_timestamp_prefix() {
    let at = Utc.timestamp_opt(0x6500_0000, 0).unwrap();
    let id = ObjectId::generate(at);
    assert!(id.to_string().starts_with("65000000"));
    assert_ne!(id, ObjectId::generate(at));
  }

  #[test]
  fn serde_uses_hex_string() {
    let id: ObjectId = "000000000000000000000001".parse().unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"000000000000000000000001\"");
    let back: ObjectId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
    assert!(serde_json::from_str::<ObjectId>("\"nope\"").is_err());
  }
}
