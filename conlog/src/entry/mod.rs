//! # Log Entries
//!
//! A [`LogEntry`] is the canonical record for one distinct
//! `(message, stack_trace)` pair. Every arrival of that content is an
//! occurrence of the same entry; stores refer to it through a copyable
//! [`EntryId`] handle instead of owning it.
//!
//! Entries live in an [`EntryPool`]: a slab with a free list. Releasing an
//! entry clears it and keeps its slot (and string buffers) around for the
//! next novel message, so steady log spam does not churn the allocator.


use std::hash::{Hash, Hasher};

use crate::event::{contains_ignore_ascii_case, Severity};

/// Free slots beyond this many give their string buffers back to the
/// allocator when released.
const MAX_POOLED_BUFFERS: usize = 4096;

/// Handle to an entry inside an [`EntryPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u32);

impl EntryId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// One distinct log message and how often it has been seen.
///
/// Equality and hashing consider only the message and stack trace: two
/// entries with identical text are the same entry whatever their severity
/// or arrival time.
#[derive(Debug, Clone, Default)]
pub struct LogEntry {
  message: String,
  stack_trace: String,
  /// Occurrences currently retained in the uncollapsed store.
  count: usize,
  /// Severity of the first occurrence.
  severity: Severity,
  /// Position in the collapsed store.
  collapsed_index: usize,
}

impl LogEntry {
  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn stack_trace(&self) -> &str {
    &self.stack_trace
  }

  pub fn count(&self) -> usize {
    self.count
  }

  pub fn severity(&self) -> Severity {
    self.severity
  }

  pub fn collapsed_index(&self) -> usize {
    self.collapsed_index
  }

  pub fn has_content(&self, message: &str, stack_trace: &str) -> bool {
    self.message == message && self.stack_trace == stack_trace
  }

  /// Case-insensitive (ASCII) substring match against message and stack trace.
  pub fn matches_search_term(&self, term: &str) -> bool {
    contains_ignore_ascii_case(&self.message, term)
      || contains_ignore_ascii_case(&self.stack_trace, term)
  }

  pub(crate) fn increment(&mut self) {
    self.count += 1;
  }

  /// Drops one occurrence, returning the remaining count.
  pub(crate) fn decrement(&mut self) -> usize {
    self.count = self.count.saturating_sub(1);
    self.count
  }

  pub(crate) fn set_collapsed_index(&mut self, index: usize) {
    self.collapsed_index = index;
  }

  /// Reinitializes a pooled entry, reusing its string buffers.
  fn initialize(&mut self, message: &str, stack_trace: &str, severity: Severity) {
    self.message.clear();
    self.message.push_str(message);
    self.stack_trace.clear();
    self.stack_trace.push_str(stack_trace);
    self.count = 1;
    self.severity = severity;
    self.collapsed_index = 0;
  }

  fn reset(&mut self, keep_buffers: bool) {
    if keep_buffers {
      self.message.clear();
      self.stack_trace.clear();
    } else {
      self.message = String::new();
      self.stack_trace = String::new();
    }
    self.count = 0;
    self.severity = Severity::default();
    self.collapsed_index = 0;
  }
}

impl PartialEq for LogEntry {
  fn eq(&self, other: &Self) -> bool {
    self.has_content(&other.message, &other.stack_trace)
  }
}

impl Eq for LogEntry {}

impl Hash for LogEntry {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.message.hash(state);
    self.stack_trace.hash(state);
  }
}

/// Slab of [`LogEntry`] values with a free list.
///
/// The pool is owned by the main-thread store; nothing here is shared with
/// producers.
#[derive(Debug, Default)]
pub struct EntryPool {
  entries: Vec<LogEntry>,
  free: Vec<EntryId>,
}

impl EntryPool {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      entries: Vec::with_capacity(capacity),
      free: Vec::new(),
    }
  }

  /// Returns a fresh entry with a count of 1, recycling a released slot if
  /// one is available.
  ///
  /// # Panics
  /// Panics if a new slot would need an index beyond `u32::MAX`.
  pub fn acquire(&mut self, message: &str, stack_trace: &str, severity: Severity) -> EntryId {
    if let Some(id) = self.free.pop() {
      self.entries[id.index()].initialize(message, stack_trace, severity);
      return id;
    }

    let id = match u32::try_from(self.entries.len()) {
      Ok(index) => EntryId(index),
      Err(_) => panic!("entry pool exhausted: more than {} live entries", u32::MAX),
    };
    let mut entry = LogEntry::default();
    entry.initialize(message, stack_trace, severity);
    self.entries.push(entry);
    id
  }

  /// Clears the entry and makes its slot available again.
  ///
  /// The caller guarantees no store still refers to `id`.
  pub fn release(&mut self, id: EntryId) {
    let keep_buffers = self.free.len() < MAX_POOLED_BUFFERS;
    self.entries[id.index()].reset(keep_buffers);
    self.free.push(id);
  }

  #[inline]
  pub fn get(&self, id: EntryId) -> &LogEntry {
    &self.entries[id.index()]
  }

  #[inline]
  pub(crate) fn get_mut(&mut self, id: EntryId) -> &mut LogEntry {
    &mut self.entries[id.index()]
  }

  /// Entries currently handed out.
  pub fn live(&self) -> usize {
    self.entries.len() - self.free.len()
  }

  /// Released slots waiting for reuse.
  pub fn pooled(&self) -> usize {
    self.free.len()
  }
}
