//! # Collapse Map
//!
//! Content-addressed index over the canonical entries: for a given
//! `(message, stack_trace)` pair it finds the one [`LogEntry`](crate::entry::LogEntry)
//! that represents it, if any.
//!
//! Keys are a 64-bit FNV-1a hash of the content. Buckets hold entry handles
//! and are almost always a single element, so they live inline in a
//! `SmallVec`; on a hash collision the bucket is scanned and the stored
//! content compared.

mod __test__;

use smallvec::SmallVec;
use std::collections::HashMap;

use crate::entry::{EntryId, EntryPool};

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Byte that never occurs in UTF-8, so `("ab", "c")` and `("a", "bc")` hash
/// differently.
const FIELD_SEPARATOR: u8 = 0xff;

#[inline]
fn fnv_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
  let chunks = bytes.chunks_exact(8);
  let remainder = chunks.remainder();

  for chunk in chunks {
    let mut word = [0u8; 8];
    word.copy_from_slice(chunk);
    hash ^= u64::from_le_bytes(word);
    hash = hash.wrapping_mul(FNV_PRIME);
  }

  for &byte in remainder {
    hash ^= byte as u64;
    hash = hash.wrapping_mul(FNV_PRIME);
  }

  hash
}

/// Hash of an entry's identity.
pub fn content_hash(message: &str, stack_trace: &str) -> u64 {
  let hash = fnv_bytes(FNV_OFFSET_BASIS, message.as_bytes());
  let hash = fnv_bytes(hash, &[FIELD_SEPARATOR]);
  fnv_bytes(hash, stack_trace.as_bytes())
}

#[derive(Debug, Default)]
pub struct CollapseMap {
  buckets: HashMap<u64, SmallVec<[EntryId; 1]>>,
  len: usize,
}

impl CollapseMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Finds the canonical entry holding exactly this content.
  pub fn find(&self, pool: &EntryPool, message: &str, stack_trace: &str) -> Option<EntryId> {
    self.find_hashed(pool, content_hash(message, stack_trace), message, stack_trace)
  }

  pub(crate) fn find_hashed(
    &self,
    pool: &EntryPool,
    hash: u64,
    message: &str,
    stack_trace: &str,
  ) -> Option<EntryId> {
    self
      .buckets
      .get(&hash)?
      .iter()
      .copied()
      .find(|&id| pool.get(id).has_content(message, stack_trace))
  }

  /// Registers `id` under its current content.
  pub fn insert(&mut self, pool: &EntryPool, id: EntryId) {
    let entry = pool.get(id);
    self.insert_hashed(content_hash(entry.message(), entry.stack_trace()), id);
  }

  pub(crate) fn insert_hashed(&mut self, hash: u64, id: EntryId) {
    self.buckets.entry(hash).or_default().push(id);
    self.len += 1;
  }

  /// Removes `id`, which must still hold the content it was inserted with.
  pub fn remove(&mut self, pool: &EntryPool, id: EntryId) -> bool {
    let entry = pool.get(id);
    let hash = content_hash(entry.message(), entry.stack_trace());

    let Some(bucket) = self.buckets.get_mut(&hash) else {
      return false;
    };
    let Some(position) = bucket.iter().position(|&candidate| candidate == id) else {
      return false;
    };

    bucket.swap_remove(position);
    if bucket.is_empty() {
      self.buckets.remove(&hash);
    }
    self.len -= 1;
    true
  }

  pub fn clear(&mut self) {
    self.buckets.clear();
    self.len = 0;
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }
}
