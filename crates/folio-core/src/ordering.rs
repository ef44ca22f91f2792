//! The canonical ordering of rankable collections.
//!
//! Items carry a non-unique integer rank. Listings sort by rank ascending,
//! then by creation time descending (newest first), then by id descending.
//! The last key only matters when two items share a rank *and* a creation
//! timestamp; it keeps the order total so repeated reads agree.
//!
//! No separate sort sequence is persisted: the order is always re-derived
//! from the stored `(order, created_at)` pairs. Storage backends must produce
//! the same order as [`canonical_cmp`].

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{ObjectId, project::Project};

/// Something that participates in the canonical ordering.
pub trait Ranked {
  fn id(&self) -> ObjectId;
  fn rank(&self) -> i64;
  fn created_at(&self) -> DateTime<Utc>;
}

impl Ranked for Project {
  fn id(&self) -> ObjectId { self.id }

  fn rank(&self) -> i64 { self.order }

  fn created_at(&self) -> DateTime<Utc> { self.created_at }
}

pub fn canonical_cmp<T: Ranked>(a: &T, b: &T) -> Ordering {
  a.rank()
    .cmp(&b.rank())
    .then_with(|| b.created_at().cmp(&a.created_at()))
    .then_with(|| b.id().cmp(&a.id()))
}

pub fn sort_canonical<T: Ranked>(items: &mut [T]) { items.sort_by(canonical_cmp); }

/// Turn a caller-supplied permutation into `(id, rank)` updates: the item at
/// position `i` gets rank `i`.
///
/// Updates must be applied in sequence; an id listed twice therefore ends up
/// with the rank of its last position.
pub fn rank_assignments(ids: &[ObjectId]) -> Vec<(ObjectId, i64)> {
  ids
    .iter()
    .zip(0_i64..)
    .map(|(id, rank)| (*id, rank))
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Item {
    id:      ObjectId,
    rank:    i64,
    created: DateTime<Utc>,
  }

  impl Ranked for Item {
    fn id(&self) -> ObjectId { self.id }

    fn rank(&self) -> i64 { self.rank }

    fn created_at(&self) -> DateTime<Utc> { self.created }
  }

  fn id(n: u8) -> ObjectId {
    let mut bytes = [0u8; 12];
    bytes[11] = n;
    ObjectId::from_bytes(bytes)
  }

  fn base() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() }

  #[test]
  fn lower_rank_first() {
    let mut items = vec![
      Item { id: id(1), rank: 2, created: base() },
      Item { id: id(2), rank: 0, created: base() },
      Item { id: id(3), rank: 1, created: base() },
    ];
    sort_canonical(&mut items);
    let ids: Vec<_> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![id(2), id(3), id(1)]);
  }

  #[test]
  fn equal_rank_newest_first() {
    let older = Item { id: id(1), rank: 0, created: base() };
    let newer = Item { id: id(2), rank: 0, created: base() + Duration::seconds(1) };
    let mut items = vec![older.clone(), newer.clone()];
    sort_canonical(&mut items);
    assert_eq!(items, vec![newer.clone(), older.clone()]);

    let mut items = vec![newer.clone(), older.clone()];
    sort_canonical(&mut items);
    assert_eq!(items, vec![newer, older]);
  }

  #[test]
  fn full_tie_is_still_deterministic() {
    let a = Item { id: id(1), rank: 0, created: base() };
    let b = Item { id: id(2), rank: 0, created: base() };
    let mut one = vec![a.clone(), b.clone()];
    let mut two = vec![b, a];
    sort_canonical(&mut one);
    sort_canonical(&mut two);
    assert_eq!(one, two);
  }

  #[test]
  fn assignments_follow_positions() {
    let assigned = rank_assignments(&[id(3), id(1), id(2)]);
    assert_eq!(assigned, vec![(id(3), 0), (id(1), 1), (id(2), 2)]);
    assert!(rank_assignments(&[]).is_empty());
  }
}
