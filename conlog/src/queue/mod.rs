//! # Ingestion Queue
//!
//! Multi-producer, single-consumer hand-off between logging threads and the
//! thread that owns the [`Console`](crate::console::Console).
//!
//! Producers call [`IngestQueue::submit`] from anywhere. A single mutex
//! guards the queued events, their timestamps, the pending per-severity
//! counters and the auto-expand marker; every operation holds it only for a
//! handful of buffer operations. Timestamps and truncation are computed
//! before the lock is taken.
//!
//! The queue enforces `max_log_count` itself: events beyond it would be
//! evicted right after processing anyway, so the oldest queued event is
//! dropped on arrival of a new one instead.

mod __test__;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::config::ConsoleConfig;
use crate::dyn_buffer::DynamicRingBuffer;
use crate::error::ConsoleError;
use crate::event::{LogEvent, Severity, SeverityCounts};
use crate::timestamp::{Clock, LogTimestamp};

/// An event handed to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dequeued {
  pub event: LogEvent,
  pub timestamp: LogTimestamp,
  /// Set on the event marked by [`IngestQueue::adjust_latest`] with
  /// `auto_expand`; the consumer should select it once processed.
  pub focus: bool,
}

#[derive(Debug)]
struct QueueState {
  events: DynamicRingBuffer<LogEvent>,
  timestamps: Option<DynamicRingBuffer<LogTimestamp>>,
  pending: SeverityCounts,
  /// Pops remaining until the auto-expand target comes out. 0 when unset.
  auto_expand_countdown: usize,
}

/// Per-severity switches; a disabled severity is dropped before queueing.
#[derive(Debug)]
struct ReceiveSwitches {
  info: AtomicBool,
  warning: AtomicBool,
  error: AtomicBool,
  exception: AtomicBool,
}

impl ReceiveSwitches {
  fn switch(&self, severity: Severity) -> &AtomicBool {
    match severity {
      Severity::Info => &self.info,
      Severity::Warning => &self.warning,
      Severity::Error => &self.error,
      Severity::Assertion | Severity::Exception => &self.exception,
    }
  }
}

#[derive(Debug)]
pub struct IngestQueue {
  state: Mutex<QueueState>,
  clock: Clock,
  receive: ReceiveSwitches,
  max_log_count: usize,
  max_log_length: usize,
}

impl IngestQueue {
  pub fn new(config: &ConsoleConfig) -> Self {
    let capacity = config.queued_log_limit.clamp(16, 4096);

    Self {
      state: Mutex::new(QueueState {
        events: DynamicRingBuffer::with_capacity(capacity),
        timestamps: config
          .capture_timestamps
          .then(|| DynamicRingBuffer::with_capacity(capacity)),
        pending: SeverityCounts::default(),
        auto_expand_countdown: 0,
      }),
      clock: Clock::new(),
      receive: ReceiveSwitches {
        info: AtomicBool::new(config.receive_info),
        warning: AtomicBool::new(config.receive_warning),
        error: AtomicBool::new(config.receive_error),
        exception: AtomicBool::new(config.receive_exception),
      },
      max_log_count: config.max_log_count,
      max_log_length: config.max_log_length,
    }
  }

  /// The state is left consistent at every point a panic could unwind
  /// through, so a poisoned lock is safe to keep using.
  fn lock(&self) -> MutexGuard<'_, QueueState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn clock(&self) -> &Clock {
    &self.clock
  }

  pub fn is_receiving(&self, severity: Severity) -> bool {
    self.receive.switch(severity).load(Ordering::Relaxed)
  }

  /// Enables or disables receiving `severity`. `Assertion` and `Exception`
  /// share one switch.
  pub fn set_receiving(&self, severity: Severity, enabled: bool) {
    self.receive.switch(severity).store(enabled, Ordering::Relaxed);
  }

  /// Prepares an event for queueing, or returns `None` if its severity is
  /// switched off.
  fn prepare(&self, mut event: LogEvent) -> Option<(LogEvent, LogTimestamp)> {
    if !self.is_receiving(event.severity) {
      return None;
    }

    event.truncate_to(self.max_log_length);
    Some((event, self.clock.now()))
  }

  /// Queues an event. Returns `false` if its severity is not being received.
  pub fn submit(&self, event: LogEvent) -> bool {
    let Some((event, timestamp)) = self.prepare(event) else {
      return false;
    };

    let mut state = self.lock();
    self.push_locked(&mut state, event, timestamp);
    true
  }

  /// Like [`submit`](Self::submit) but gives up instead of waiting when the
  /// lock is held, e.g. when called from a panic hook that may have
  /// interrupted a thread in the middle of a submission.
  pub fn try_submit(&self, event: LogEvent) -> bool {
    let Some((event, timestamp)) = self.prepare(event) else {
      return false;
    };

    let mut state = match self.state.try_lock() {
      Ok(state) => state,
      Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
      Err(TryLockError::WouldBlock) => return false,
    };
    self.push_locked(&mut state, event, timestamp);
    true
  }

  fn push_locked(&self, state: &mut QueueState, event: LogEvent, timestamp: LogTimestamp) {
    if state.events.len() + 1 >= self.max_log_count {
      if let Some(evicted) = state.events.pop_front() {
        state.pending.forget(evicted.severity);
        if let Some(timestamps) = state.timestamps.as_mut() {
          timestamps.pop_front();
        }
        // The marked event moved one step closer to the front, or is gone.
        state.auto_expand_countdown = state.auto_expand_countdown.saturating_sub(1);
      }
    }

    state.pending.record(event.severity);
    state.events.push_back(event);
    if let Some(timestamps) = state.timestamps.as_mut() {
      timestamps.push_back(timestamp);
    }
  }

  /// Removes the oldest queued event.
  pub fn pop(&self) -> Option<Dequeued> {
    let mut state = self.lock();
    let event = state.events.pop_front()?;
    let timestamp = state
      .timestamps
      .as_mut()
      .and_then(|timestamps| timestamps.pop_front())
      .unwrap_or_default();

    let focus = match state.auto_expand_countdown {
      0 => false,
      countdown => {
        state.auto_expand_countdown = countdown - 1;
        countdown == 1
      }
    };

    Some(Dequeued {
      event,
      timestamp,
      focus,
    })
  }

  /// Pops `count` events in arrival order, handing each to `on_event`.
  ///
  /// The lock is taken once per event so producers are never blocked for
  /// the length of a batch.
  pub fn drain<F>(&self, count: usize, mut on_event: F) -> Result<usize, ConsoleError>
  where
    F: FnMut(Dequeued),
  {
    let queued = self.len();
    if count > queued {
      return Err(ConsoleError::DrainOutOfRange {
        requested: count,
        queued,
      });
    }

    let mut drained = 0;
    while drained < count {
      let Some(item) = self.pop() else {
        break;
      };
      on_event(item);
      drained += 1;
    }
    Ok(drained)
  }

  /// Returns the per-severity counts accumulated since the last call and
  /// resets them.
  pub fn take_pending_counts(&self) -> SeverityCounts {
    std::mem::take(&mut self.lock().pending)
  }

  /// Modifies the most recently queued event: optionally marks it to be
  /// focused once processed and/or drops its stack trace. Does nothing when
  /// the queue is empty.
  pub fn adjust_latest(&self, auto_expand: bool, strip_stack_trace: bool) {
    let mut state = self.lock();
    let len = state.events.len();
    if len == 0 {
      return;
    }

    if auto_expand {
      state.auto_expand_countdown = len;
    }

    if strip_stack_trace {
      if let Some(latest) = state.events.last_mut() {
        latest.stack_trace.clear();
      }
    }
  }

  pub fn len(&self) -> usize {
    self.lock().events.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
