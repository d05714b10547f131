use thiserror::Error;

/// Contract violations raised by [`DynamicRingBuffer`](crate::dyn_buffer::DynamicRingBuffer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
  #[error("cannot trim {requested} elements from a buffer holding {len}")]
  TrimOutOfRange { requested: usize, len: usize },

  #[error("synchronized buffer holds {synchronized} elements, expected {expected}")]
  LengthMismatch { expected: usize, synchronized: usize },
}

/// Errors surfaced by the console's main-thread API.
#[derive(Debug, Error)]
pub enum ConsoleError {
  #[error("cannot drain {requested} events, only {queued} are queued")]
  DrainOutOfRange { requested: usize, queued: usize },

  #[error("view index {index} is out of range for a view of {len} entries")]
  ViewIndexOutOfRange { index: usize, len: usize },

  #[error(transparent)]
  Buffer(#[from] BufferError),

  #[error("failed to write logs: {0}")]
  Io(#[from] std::io::Error),
}

/// Errors produced while loading or validating a [`ConsoleConfig`](crate::config::ConsoleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value for `{field}`: {reason}")]
  Invalid { field: &'static str, reason: String },

  #[error("failed to read config file: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),
}
