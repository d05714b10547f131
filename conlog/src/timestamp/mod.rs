//! Arrival timestamps for log entries.
//!
//! Capturing a timestamp per event is optional. When it is disabled the
//! zero value `LogTimestamp::default()` is used everywhere instead.

mod __test__;

use chrono::{Duration, Local, NaiveDateTime};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LogTimestamp {
  /// Local wall-clock time at which the event was submitted.
  pub wall_clock: NaiveDateTime,

  /// Seconds since the console's clock was created.
  #[cfg(feature = "elapsed-time")]
  pub elapsed_seconds: f32,

  /// Host frame counter at submission.
  #[cfg(feature = "frame-count")]
  pub frame: u64,
}

impl LogTimestamp {
  /// Appends `HH:MM:SS` to `out`.
  pub fn append_time(&self, out: &mut String) {
    let _ = write!(out, "{}", self.wall_clock.format("%H:%M:%S"));
  }

  /// Appends the full description shown for an expanded entry, e.g.
  /// `2024-03-01 14:02:11 (1.25s) [Frame: 96]`.
  pub fn append_full(&self, out: &mut String) {
    let _ = write!(out, "{}", self.wall_clock.format("%Y-%m-%d %H:%M:%S"));
    #[cfg(feature = "elapsed-time")]
    let _ = write!(out, " ({:.2}s)", self.elapsed_seconds);
    #[cfg(feature = "frame-count")]
    let _ = write!(out, " [Frame: {}]", self.frame);
  }
}

/// Produces timestamps from any thread.
///
/// The local wall-clock time is resolved once at construction; every later
/// timestamp adds the monotonic time elapsed since then, which avoids a
/// time-zone conversion per event. The frame counter is advanced by the
/// console's owner once per tick.
#[derive(Debug)]
pub struct Clock {
  origin_wall: NaiveDateTime,
  origin: Instant,
  frame: AtomicU64,
}

impl Default for Clock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock {
  pub fn new() -> Self {
    Self {
      origin_wall: Local::now().naive_local(),
      origin: Instant::now(),
      frame: AtomicU64::new(0),
    }
  }

  pub fn now(&self) -> LogTimestamp {
    let elapsed = self.origin.elapsed();
    let offset = Duration::from_std(elapsed).unwrap_or_else(|_| Duration::zero());
    let wall_clock = self
      .origin_wall
      .checked_add_signed(offset)
      .unwrap_or(self.origin_wall);

    LogTimestamp {
      wall_clock,
      #[cfg(feature = "elapsed-time")]
      elapsed_seconds: elapsed.as_secs_f32(),
      #[cfg(feature = "frame-count")]
      frame: self.frame(),
    }
  }

  #[inline]
  pub fn frame(&self) -> u64 {
    self.frame.load(Ordering::Relaxed)
  }

  /// Advances the frame counter, returning the new frame number.
  pub fn advance_frame(&self) -> u64 {
    self.frame.fetch_add(1, Ordering::Relaxed) + 1
  }
}
