//! Recently entered commands, navigable like a shell history.

mod __test__;

use crate::buffer::RingBuffer;

/// Bounded command history. The oldest command is dropped once the
/// configured size is exceeded, and entering the same command twice in a
/// row stores it once.
///
/// ```rust
/// use conlog::history::CommandHistory;
///
/// let mut history = CommandHistory::new(2);
/// history.push("help");
/// history.push("spawn enemy");
/// history.push("spawn enemy");
/// history.push("quit");
///
/// assert_eq!(history.previous(), Some("quit"));
/// assert_eq!(history.previous(), Some("spawn enemy"));
/// assert_eq!(history.previous(), Some("spawn enemy"));
/// assert_eq!(history.next(), Some("quit"));
/// assert_eq!(history.next(), None);
/// ```
#[derive(Debug, Clone)]
pub struct CommandHistory {
  commands: RingBuffer<String>,
  /// Position of the command last returned by navigation; `len` when the
  /// cursor is past the newest command.
  cursor: usize,
}

impl CommandHistory {
  /// Panics if `capacity` is 0.
  pub fn new(capacity: usize) -> Self {
    Self {
      commands: RingBuffer::new(capacity),
      cursor: 0,
    }
  }

  /// Records an entered command and resets navigation to the newest end.
  /// Blank commands are ignored.
  pub fn push(&mut self, command: &str) {
    let command = command.trim();
    if !command.is_empty() && self.commands.last().map(String::as_str) != Some(command) {
      self.commands.push(command.to_string());
    }
    self.cursor = self.commands.len();
  }

  /// Steps back to the previous (older) command, stopping at the oldest.
  pub fn previous(&mut self) -> Option<&str> {
    if self.commands.is_empty() {
      return None;
    }
    self.cursor = self.cursor.saturating_sub(1);
    self.commands.get(self.cursor).map(String::as_str)
  }

  /// Steps forward to the next (newer) command. Returns `None` once past
  /// the newest, which leaves the input empty.
  #[allow(clippy::should_implement_trait)]
  pub fn next(&mut self) -> Option<&str> {
    if self.cursor >= self.commands.len() {
      return None;
    }
    self.cursor += 1;
    self.commands.get(self.cursor).map(String::as_str)
  }

  /// Empties the history, returning its commands oldest first (e.g. to
  /// persist them on shutdown).
  pub fn take_all(&mut self) -> Vec<String> {
    self.cursor = 0;
    self.commands.take_snapshot()
  }

  /// Commands from oldest to newest.
  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.commands.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.commands.capacity()
  }
}
