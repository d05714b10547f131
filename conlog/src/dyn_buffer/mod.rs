//! # Dynamic Ring Buffer
//!
//! A growable double-ended ring buffer with random access by logical index.
//!
//! Elements live in a circular slot array that is only reallocated when full
//! (capacity doubles, minimum 4). Besides the usual push/pop at both ends the
//! buffer supports the bulk shapes a log history needs:
//!
//! - **Range append** from another buffer, handling both buffers' wraparound
//! - **Trim** from either end with an optional per-element callback
//! - **Compaction** that removes elements matching a predicate in one pass,
//!   optionally permuting a second, synchronized buffer in lockstep and
//!   reporting the new index of every moved survivor
//!
//! All removal variants are O(n) single-pass. Vacated slots are always
//! cleared, so the buffer never keeps dead values alive.
//!
//! ## Usage
//!
//! ```rust
//! use conlog::dyn_buffer::DynamicRingBuffer;
//!
//! let mut buffer = DynamicRingBuffer::new();
//! buffer.push_back(2);
//! buffer.push_back(3);
//! buffer.push_front(1);
//! assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//!
//! let removed = buffer.remove_all(&mut |value: &i32| value % 2 == 1);
//! assert_eq!(removed, 2);
//! assert_eq!(buffer[0], 2);
//! ```


use std::ops::{Index, IndexMut};

use crate::error::BufferError;

/// Smallest capacity the buffer grows to.
const MIN_GROWTH: usize = 4;

/// Capacity used by [`DynamicRingBuffer::new`].
const DEFAULT_CAPACITY: usize = 2;

/// Callbacks driving [`DynamicRingBuffer::remove_all`].
///
/// Any `FnMut(&T) -> bool` closure is a compaction that ignores index
/// changes. Implement the trait directly when both callbacks need the same
/// mutable state.
pub trait Compaction<T> {
  /// Returns `true` if `item` must be removed.
  fn should_remove(&mut self, item: &T) -> bool;

  /// Called for every surviving element whose logical index changed,
  /// with its new index.
  fn index_changed(&mut self, _item: &T, _new_index: usize) {}
}

impl<T, F> Compaction<T> for F
where
  F: FnMut(&T) -> bool,
{
  fn should_remove(&mut self, item: &T) -> bool {
    self(item)
  }
}

/// Growable circular buffer addressable by logical index `0..len`.
#[derive(Debug, Clone)]
pub struct DynamicRingBuffer<T> {
  /// Backing slots. The `len` slots starting at `start` (wrapping) are
  /// always `Some`; anything outside that range is unreachable.
  slots: Box<[Option<T>]>,
  /// Physical index of logical element 0.
  start: usize,
  len: usize,
}

fn empty_slots<T>(capacity: usize) -> Box<[Option<T>]> {
  (0..capacity).map(|_| None).collect()
}

impl<T> Default for DynamicRingBuffer<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> DynamicRingBuffer<T> {
  pub fn new() -> Self {
    Self::with_capacity(DEFAULT_CAPACITY)
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      slots: empty_slots(capacity),
      start: 0,
      len: 0,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  #[inline]
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  /// Maps a logical index (`< capacity`) to its physical slot.
  #[inline]
  fn physical(&self, index: usize) -> usize {
    let capacity = self.slots.len();
    let position = self.start + index;
    if position >= capacity {
      position - capacity
    } else {
      position
    }
  }

  /// Reallocates to `capacity` slots and unwraps the contents to start at 0.
  fn set_capacity(&mut self, capacity: usize) {
    let mut slots = empty_slots(capacity);
    for (index, slot) in slots.iter_mut().take(self.len).enumerate() {
      let from = self.physical(index);
      *slot = self.slots[from].take();
    }

    self.slots = slots;
    self.start = 0;
  }

  #[inline]
  fn grow_if_full(&mut self) {
    if self.len == self.slots.len() {
      self.set_capacity((self.slots.len() * 2).max(MIN_GROWTH));
    }
  }

  /// Appends `value` at the end. Amortized O(1).
  pub fn push_back(&mut self, value: T) {
    self.grow_if_full();

    let slot = self.physical(self.len);
    self.slots[slot] = Some(value);
    self.len += 1;
  }

  /// Inserts `value` at the beginning. Amortized O(1).
  pub fn push_front(&mut self, value: T) {
    self.grow_if_full();

    self.start = if self.start > 0 {
      self.start - 1
    } else {
      self.slots.len() - 1
    };
    self.slots[self.start] = Some(value);
    self.len += 1;
  }

  /// Removes and returns the first element.
  pub fn pop_front(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    let item = self.slots[self.start].take();
    self.start = self.physical(1);
    self.len -= 1;
    item
  }

  /// Removes and returns the last element.
  pub fn pop_back(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    let slot = self.physical(self.len - 1);
    self.len -= 1;
    self.slots[slot].take()
  }

  pub fn get(&self, index: usize) -> Option<&T> {
    if index >= self.len {
      return None;
    }
    self.slots[self.physical(index)].as_ref()
  }

  pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
    if index >= self.len {
      return None;
    }
    let slot = self.physical(index);
    self.slots[slot].as_mut()
  }

  pub fn first(&self) -> Option<&T> {
    self.get(0)
  }

  pub fn last(&self) -> Option<&T> {
    self.len.checked_sub(1).and_then(|index| self.get(index))
  }

  pub fn last_mut(&mut self) -> Option<&mut T> {
    self.len.checked_sub(1).and_then(|index| self.get_mut(index))
  }

  /// The live slots as two physical runs: before and after the wrap point.
  fn live_slots(&self) -> (&[Option<T>], &[Option<T>]) {
    let before_wrap = self.len.min(self.slots.len() - self.start);
    (
      &self.slots[self.start..self.start + before_wrap],
      &self.slots[..self.len - before_wrap],
    )
  }

  /// Iterates elements in logical order.
  pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
    let (head, tail) = self.live_slots();
    head.iter().chain(tail.iter()).filter_map(Option::as_ref)
  }

  pub fn for_each<F>(&self, action: F)
  where
    F: FnMut(&T),
  {
    self.iter().for_each(action);
  }

  /// Logical index of the first element equal to `value`.
  pub fn index_of(&self, value: &T) -> Option<usize>
  where
    T: PartialEq,
  {
    self.iter().position(|item| item == value)
  }

  /// Appends clones of every element of `other`, in order.
  ///
  /// Equivalent to calling [`push_back`](Self::push_back) for each element
  /// but copies whole runs at a time, at most one reallocation.
  pub fn extend_from(&mut self, other: &DynamicRingBuffer<T>)
  where
    T: Clone,
  {
    if other.is_empty() {
      return;
    }

    let required = self.len + other.len;
    if self.slots.len() < required {
      self.set_capacity((self.slots.len() * 2).max(required));
    }

    let capacity = self.slots.len();
    let mut insert_at = self.physical(self.len);
    let (head, tail) = other.live_slots();
    for mut run in [head, tail] {
      while !run.is_empty() {
        let copied = (capacity - insert_at).min(run.len());
        self.slots[insert_at..insert_at + copied].clone_from_slice(&run[..copied]);
        run = &run[copied..];
        insert_at += copied;
        if insert_at == capacity {
          insert_at = 0;
        }
      }
    }

    self.len = required;
  }

  fn check_trim(&self, count: usize) -> Result<(), BufferError> {
    if count > self.len {
      return Err(BufferError::TrimOutOfRange {
        requested: count,
        len: self.len,
      });
    }
    Ok(())
  }

  /// Takes `count` elements out of the slots starting at physical `from`,
  /// handing each to `on_removed`. Bookkeeping must already exclude them.
  fn drain_detached<F>(&mut self, from: usize, count: usize, mut on_removed: F)
  where
    F: FnMut(T),
  {
    let capacity = self.slots.len();
    let mut slot = from;
    for _ in 0..count {
      if let Some(item) = self.slots[slot].take() {
        on_removed(item);
      }
      slot += 1;
      if slot == capacity {
        slot = 0;
      }
    }
  }

  /// Drops the first `count` elements.
  pub fn trim_start(&mut self, count: usize) -> Result<(), BufferError> {
    self.trim_start_with(count, drop)
  }

  /// Removes the first `count` elements, oldest first, passing each to
  /// `on_removed`.
  ///
  /// The buffer's length is updated and each slot cleared before the
  /// callback sees the element, so a panicking callback cannot corrupt it.
  pub fn trim_start_with<F>(&mut self, count: usize, on_removed: F) -> Result<(), BufferError>
  where
    F: FnMut(T),
  {
    self.check_trim(count)?;
    if count == 0 {
      return Ok(());
    }

    let from = self.start;
    self.start = self.physical(count);
    self.len -= count;
    self.drain_detached(from, count, on_removed);
    Ok(())
  }

  /// Drops the last `count` elements.
  pub fn trim_end(&mut self, count: usize) -> Result<(), BufferError> {
    self.trim_end_with(count, drop)
  }

  /// Removes the last `count` elements in logical order, passing each to
  /// `on_removed`. Same callback guarantees as [`trim_start_with`](Self::trim_start_with).
  pub fn trim_end_with<F>(&mut self, count: usize, on_removed: F) -> Result<(), BufferError>
  where
    F: FnMut(T),
  {
    self.check_trim(count)?;
    if count == 0 {
      return Ok(());
    }

    let from = self.physical(self.len - count);
    self.len -= count;
    self.drain_detached(from, count, on_removed);
    Ok(())
  }

  /// Drops every element. Capacity is kept.
  pub fn clear(&mut self) {
    let (from, count) = (self.start, self.len);
    self.start = 0;
    self.len = 0;
    self.drain_detached(from, count, drop);
  }

  /// Moves the element at logical `from` into the empty slot at logical `to`.
  #[inline]
  fn shift(&mut self, from: usize, to: usize) {
    let (from, to) = (self.physical(from), self.physical(to));
    self.slots[to] = self.slots[from].take();
  }

  /// Removes every element for which `compaction` says so, keeping the
  /// relative order of survivors. Returns the number removed.
  pub fn remove_all<C>(&mut self, compaction: &mut C) -> usize
  where
    C: Compaction<T>,
  {
    self.compact::<(), C>(compaction, None)
  }

  /// Like [`remove_all`](Self::remove_all), and applies the identical
  /// permutation to `synchronized`, which must have the same length.
  pub fn remove_all_synced<Y, C>(
    &mut self,
    compaction: &mut C,
    synchronized: &mut DynamicRingBuffer<Y>,
  ) -> Result<usize, BufferError>
  where
    C: Compaction<T>,
  {
    if synchronized.len != self.len {
      return Err(BufferError::LengthMismatch {
        expected: self.len,
        synchronized: synchronized.len,
      });
    }
    Ok(self.compact(compaction, Some(synchronized)))
  }

  fn compact<Y, C>(
    &mut self,
    compaction: &mut C,
    synchronized: Option<&mut DynamicRingBuffer<Y>>,
  ) -> usize
  where
    C: Compaction<T>,
  {
    let original_len = self.len;
    let mut guard = CompactGuard {
      primary: self,
      synchronized,
      read: 0,
      write: 0,
      original_len,
    };

    while guard.read < guard.original_len {
      let read = guard.read;
      let remove = guard
        .primary
        .get(read)
        .map_or(true, |item| compaction.should_remove(item));

      if remove {
        let slot = guard.primary.physical(read);
        guard.primary.slots[slot] = None;
        if let Some(synchronized) = guard.synchronized.as_deref_mut() {
          let slot = synchronized.physical(read);
          synchronized.slots[slot] = None;
        }
        guard.read += 1;
        continue;
      }

      let write = guard.write;
      guard.read += 1;
      guard.write += 1;
      if read != write {
        guard.primary.shift(read, write);
        if let Some(synchronized) = guard.synchronized.as_deref_mut() {
          synchronized.shift(read, write);
        }

        let slot = guard.primary.physical(write);
        if let Some(item) = &guard.primary.slots[slot] {
          compaction.index_changed(item, write);
        }
      }
    }

    guard.original_len - guard.write
  }
}

/// Finalizes a compaction, including one interrupted by a panicking
/// callback: unvisited elements are shifted down over the removed gap and
/// the lengths of both buffers are fixed up.
struct CompactGuard<'a, T, Y> {
  primary: &'a mut DynamicRingBuffer<T>,
  synchronized: Option<&'a mut DynamicRingBuffer<Y>>,
  read: usize,
  write: usize,
  original_len: usize,
}

impl<T, Y> Drop for CompactGuard<'_, T, Y> {
  fn drop(&mut self) {
    let unvisited = self.original_len - self.read;
    if self.read != self.write {
      for offset in 0..unvisited {
        self.primary.shift(self.read + offset, self.write + offset);
        if let Some(synchronized) = self.synchronized.as_deref_mut() {
          synchronized.shift(self.read + offset, self.write + offset);
        }
      }
    }

    let len = self.write + unvisited;
    self.primary.len = len;
    if let Some(synchronized) = self.synchronized.as_deref_mut() {
      synchronized.len = len;
    }
  }
}

impl<T> Index<usize> for DynamicRingBuffer<T> {
  type Output = T;

  fn index(&self, index: usize) -> &T {
    match self.get(index) {
      Some(item) => item,
      None => panic!(
        "index {} out of range for buffer of length {}",
        index, self.len
      ),
    }
  }
}

impl<T> IndexMut<usize> for DynamicRingBuffer<T> {
  fn index_mut(&mut self, index: usize) -> &mut T {
    let len = self.len;
    match self.get_mut(index) {
      Some(item) => item,
      None => panic!("index {} out of range for buffer of length {}", index, len),
    }
  }
}

impl<T> FromIterator<T> for DynamicRingBuffer<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let iter = iter.into_iter();
    let mut buffer = Self::with_capacity(iter.size_hint().0.max(DEFAULT_CAPACITY));
    for item in iter {
      buffer.push_back(item);
    }
    buffer
  }
}
