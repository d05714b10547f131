
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor};

/// Severity of a log event, as reported by the producer.
///
/// `Assertion` and `Exception` are kept distinct for display, but both fall
/// into the [`LogFilter::ERROR`] bucket for filtering and counting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
  /// General informational messages
  #[default]
  Info,
  /// Warning messages that indicate potential issues
  Warning,
  /// Error messages that indicate a failure
  Error,
  /// A failed assertion
  Assertion,
  /// An unhandled exception or panic
  Exception,
}

impl Severity {
  /// The filter bit this severity is shown under.
  pub fn filter_bit(self) -> LogFilter {
    match self {
      Severity::Info => LogFilter::INFO,
      Severity::Warning => LogFilter::WARNING,
      Severity::Error | Severity::Assertion | Severity::Exception => LogFilter::ERROR,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Severity::Info => "INFO",
      Severity::Warning => "WARN",
      Severity::Error => "ERROR",
      Severity::Assertion => "ASSERT",
      Severity::Exception => "EXCEPTION",
    }
  }
}

impl From<&tracing::Level> for Severity {
  fn from(level: &tracing::Level) -> Self {
    match *level {
      tracing::Level::ERROR => Severity::Error,
      tracing::Level::WARN => Severity::Warning,
      _ => Severity::Info,
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Bitmask selecting which severities the filtered view shows.
///
/// ```rust
/// use conlog::event::{LogFilter, Severity};
///
/// let filter = LogFilter::INFO | LogFilter::ERROR;
/// assert!(filter.allows(Severity::Exception));
/// assert!(!filter.allows(Severity::Warning));
/// assert!(LogFilter::ALL.is_all());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogFilter(u32);

impl LogFilter {
  pub const NONE: LogFilter = LogFilter(0);
  pub const INFO: LogFilter = LogFilter(1);
  pub const WARNING: LogFilter = LogFilter(2);
  pub const ERROR: LogFilter = LogFilter(4);
  pub const ALL: LogFilter = LogFilter(!0);

  pub const fn from_bits(bits: u32) -> Self {
    LogFilter(bits)
  }

  pub const fn bits(self) -> u32 {
    self.0
  }

  pub const fn contains(self, other: LogFilter) -> bool {
    self.0 & other.0 == other.0
  }

  pub const fn is_all(self) -> bool {
    self.0 == Self::ALL.0
  }

  pub const fn is_none(self) -> bool {
    self.0 == 0
  }

  /// Whether an entry of `severity` passes the mask.
  pub fn allows(self, severity: Severity) -> bool {
    self.is_all() || self.contains(severity.filter_bit())
  }

  /// Flips the given bits on or off.
  pub const fn toggle(self, bits: LogFilter) -> Self {
    LogFilter(self.0 ^ bits.0)
  }
}

impl Default for LogFilter {
  fn default() -> Self {
    LogFilter::ALL
  }
}

impl BitOr for LogFilter {
  type Output = LogFilter;

  fn bitor(self, rhs: LogFilter) -> LogFilter {
    LogFilter(self.0 | rhs.0)
  }
}

impl BitAnd for LogFilter {
  type Output = LogFilter;

  fn bitand(self, rhs: LogFilter) -> LogFilter {
    LogFilter(self.0 & rhs.0)
  }
}

impl BitXor for LogFilter {
  type Output = LogFilter;

  fn bitxor(self, rhs: LogFilter) -> LogFilter {
    LogFilter(self.0 ^ rhs.0)
  }
}

/// A raw log event waiting in the ingestion queue.
///
/// Events are immutable once queued; the queue owns them until they are
/// drained into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
  /// The log message.
  pub message: String,

  /// Stack trace or origin of the event. May be empty.
  pub stack_trace: String,

  pub severity: Severity,
}

impl LogEvent {
  /// Creates a new `LogEvent`.
  ///
  /// # Example
  ///
  /// ```rust
  /// use conlog::event::{LogEvent, Severity};
  /// let event = LogEvent::new("Player spawned", "", Severity::Info);
  /// assert_eq!(event.message, "Player spawned");
  /// ```
  pub fn new(
    message: impl Into<String>,
    stack_trace: impl Into<String>,
    severity: Severity,
  ) -> Self {
    Self {
      message: message.into(),
      stack_trace: stack_trace.into(),
      severity,
    }
  }

  /// Case-insensitive (ASCII) substring match against message and stack trace.
  pub fn matches_search_term(&self, term: &str) -> bool {
    contains_ignore_ascii_case(&self.message, term)
      || contains_ignore_ascii_case(&self.stack_trace, term)
  }

  /// Shortens the event so message plus stack trace fit in `max_len` bytes,
  /// marking each cut component with `<truncated>`.
  ///
  /// When both parts are long each keeps half of the budget, otherwise only
  /// the longer part is cut. A cut stack trace keeps a trailing newline.
  pub fn truncate_to(&mut self, max_len: usize) {
    const MARKER: &str = "<truncated>";

    if self.message.len() + self.stack_trace.len() <= max_len {
      return;
    }

    if self.stack_trace.is_empty() {
      cut_with_marker(&mut self.message, max_len.saturating_sub(MARKER.len()), "");
      return;
    }

    let half = max_len / 2;
    if self.message.len() >= half {
      if self.stack_trace.len() >= half {
        cut_with_marker(&mut self.message, half.saturating_sub(MARKER.len()), "");
        cut_with_marker(
          &mut self.stack_trace,
          half.saturating_sub(MARKER.len() + 1),
          "\n",
        );
      } else {
        let budget = max_len - self.stack_trace.len();
        cut_with_marker(&mut self.message, budget.saturating_sub(MARKER.len()), "");
      }
    } else {
      let budget = max_len - self.message.len();
      cut_with_marker(
        &mut self.stack_trace,
        budget.saturating_sub(MARKER.len() + 1),
        "\n",
      );
    }
  }
}

/// Truncates `text` to at most `keep` bytes (on a char boundary) and appends
/// the truncation marker followed by `suffix`.
fn cut_with_marker(text: &mut String, keep: usize, suffix: &str) {
  let mut end = keep.min(text.len());
  while !text.is_char_boundary(end) {
    end -= 1;
  }
  text.truncate(end);
  text.push_str("<truncated>");
  text.push_str(suffix);
}

/// Substring test ignoring ASCII case. An empty needle always matches.
pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
  let (haystack, needle) = (haystack.as_bytes(), needle.as_bytes());
  if needle.is_empty() {
    return true;
  }
  haystack.len() >= needle.len()
    && haystack
      .windows(needle.len())
      .any(|window| window.eq_ignore_ascii_case(needle))
}

impl fmt::Display for LogEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.severity, self.message)
  }
}

/// Per-bucket event counters (info / warning / error).
///
/// Signed because pending deltas may be negative: a queued event that was
/// already counted can be evicted before it is processed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
  pub info: i64,
  pub warning: i64,
  pub error: i64,
}

impl SeverityCounts {
  fn bucket(&mut self, severity: Severity) -> &mut i64 {
    match severity {
      Severity::Info => &mut self.info,
      Severity::Warning => &mut self.warning,
      Severity::Error | Severity::Assertion | Severity::Exception => &mut self.error,
    }
  }

  pub fn record(&mut self, severity: Severity) {
    *self.bucket(severity) += 1;
  }

  pub fn forget(&mut self, severity: Severity) {
    *self.bucket(severity) -= 1;
  }

  pub fn add(&mut self, other: SeverityCounts) {
    self.info += other.info;
    self.warning += other.warning;
    self.error += other.error;
  }

  pub fn subtract(&mut self, other: SeverityCounts) {
    self.info -= other.info;
    self.warning -= other.warning;
    self.error -= other.error;
  }

  pub fn total(&self) -> i64 {
    self.info + self.warning + self.error
  }

  pub fn is_zero(&self) -> bool {
    *self == SeverityCounts::default()
  }
}
