
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Index;

/// A fixed-capacity ring buffer that stores items in insertion order.
///
/// When the buffer reaches its capacity, adding a new item
/// silently overwrites the oldest one. The buffer never grows.
///
/// # Type Parameters
/// * `T` - The type of the items stored in the buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingBuffer<T> {
  /// Internal storage for the buffer
  data: VecDeque<T>,

  /// Maximum number of items the buffer can hold
  capacity: usize,
}

impl<T> RingBuffer<T> {
  /// Creates a new empty ring buffer with the specified capacity.
  ///
  /// # Panics
  /// Panics if `capacity` is zero.
  ///
  /// # Example
  /// ```rust
  /// use conlog::buffer::RingBuffer;
  ///
  /// let buffer: RingBuffer<i32> = RingBuffer::new(10);
  /// assert_eq!(buffer.len(), 0);
  /// assert_eq!(buffer.capacity(), 10);
  /// ```
  pub fn new(capacity: usize) -> Self {
    if capacity == 0 {
      panic!("Capacity must be greater than 0");
    }

    Self {
      data: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Adds a new item to the buffer.
  ///
  /// If the buffer is already at capacity, the oldest item is dropped
  /// to make space for the new item.
  ///
  /// # Example
  /// ```rust
  /// use conlog::buffer::RingBuffer;
  ///
  /// let mut buffer = RingBuffer::new(3);
  /// for i in 1..=4 {
  ///     buffer.push(i);
  /// }
  /// assert_eq!(buffer[0], 2);
  /// assert_eq!(buffer.len(), 3);
  /// ```
  pub fn push(&mut self, item: T) {
    if self.data.len() == self.capacity {
      self.data.pop_front();
    }
    self.data.push_back(item);
  }

  /// Returns the item at logical `index` (0 is the oldest), if present.
  pub fn get(&self, index: usize) -> Option<&T> {
    self.data.get(index)
  }

  /// Returns the most recently pushed item.
  pub fn last(&self) -> Option<&T> {
    self.data.back()
  }

  /// Removes and returns all items, oldest first, leaving the buffer empty
  /// with its capacity intact.
  ///
  /// ```rust
  /// use conlog::buffer::RingBuffer;
  ///
  /// let mut buffer = RingBuffer::new(2);
  /// buffer.push("a");
  /// buffer.push("b");
  /// buffer.push("c");
  /// assert_eq!(buffer.take_snapshot(), vec!["b", "c"]);
  /// assert!(buffer.is_empty());
  /// ```
  pub fn take_snapshot(&mut self) -> Vec<T> {
    let taken = std::mem::replace(&mut self.data, VecDeque::with_capacity(self.capacity));
    taken.into()
  }

  /// Returns an iterator over the items, oldest to newest.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.data.iter()
  }

  /// Returns the number of items currently in the buffer.
  pub fn len(&self) -> usize {
    self.data.len()
  }

  /// Returns `true` if the buffer is empty.
  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Returns the fixed capacity chosen at construction.
  pub fn capacity(&self) -> usize {
    self.capacity
  }
}

impl<T> Index<usize> for RingBuffer<T> {
  type Output = T;

  fn index(&self, index: usize) -> &T {
    match self.data.get(index) {
      Some(item) => item,
      None => panic!(
        "index {} out of range for ring buffer of length {}",
        index,
        self.data.len()
      ),
    }
  }
}
