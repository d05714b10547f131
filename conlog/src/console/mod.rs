//! # Console
//!
//! The entry point tying the pieces together. A [`Console`] owns the
//! [`LogStore`] and is driven from one thread; any number of
//! [`ConsoleHandle`]s feed it from anywhere.
//!
//! ```rust
//! use conlog::config::ConsoleConfig;
//! use conlog::console::Console;
//! use conlog::event::Severity;
//!
//! let mut console = Console::new(ConsoleConfig::default()).unwrap();
//! let handle = console.handle();
//!
//! std::thread::spawn(move || {
//!   handle.submit("Loaded level", "", Severity::Info);
//! })
//! .join()
//! .unwrap();
//!
//! console.tick(true).unwrap();
//! let view = console.filtered_view();
//! assert_eq!(view.len(), 1);
//! assert_eq!(view.get(0).unwrap().entry.message(), "Loaded level");
//! ```


use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::entry::EntryId;
use crate::error::{ConfigError, ConsoleError};
use crate::event::{LogEvent, LogFilter, Severity, SeverityCounts};
use crate::export;
use crate::history::CommandHistory;
use crate::queue::IngestQueue;
use crate::store::{EvictionReport, LogStore, ViewItem};

/// Cloneable, thread-safe producer side of a [`Console`].
#[derive(Debug, Clone)]
pub struct ConsoleHandle {
  queue: Arc<IngestQueue>,
}

impl ConsoleHandle {
  /// Queues a log event. Returns `false` if the severity is switched off.
  pub fn submit(
    &self,
    message: impl Into<String>,
    stack_trace: impl Into<String>,
    severity: Severity,
  ) -> bool {
    self.queue.submit(LogEvent::new(message, stack_trace, severity))
  }

  pub fn submit_event(&self, event: LogEvent) -> bool {
    self.queue.submit(event)
  }

  /// Queues an event unless the queue is locked right now.
  pub fn try_submit(&self, event: LogEvent) -> bool {
    self.queue.try_submit(event)
  }

  /// See [`IngestQueue::adjust_latest`].
  pub fn adjust_latest(&self, auto_expand: bool, strip_stack_trace: bool) {
    self.queue.adjust_latest(auto_expand, strip_stack_trace);
  }

  pub fn set_receiving(&self, severity: Severity, enabled: bool) {
    self.queue.set_receiving(severity, enabled);
  }

  /// Events waiting to be processed.
  pub fn queued(&self) -> usize {
    self.queue.len()
  }
}

/// What a call to [`Console::tick`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
  pub processed: usize,
  pub eviction: Option<EvictionReport>,
  /// Whether the filtered view changed since the previous tick.
  pub view_changed: bool,
}

/// Read-only window over the filtered view, valid until the next mutating
/// call on the console.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
  store: &'a LogStore,
}

impl<'a> FilteredView<'a> {
  pub fn len(&self) -> usize {
    self.store.view_len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn get(&self, index: usize) -> Result<ViewItem<'a>, ConsoleError> {
    self
      .store
      .view_item(index)
      .ok_or(ConsoleError::ViewIndexOutOfRange {
        index,
        len: self.len(),
      })
  }

  pub fn iter(&self) -> impl Iterator<Item = ViewItem<'a>> + 'a {
    let store = self.store;
    (0..store.view_len()).filter_map(move |index| store.view_item(index))
  }
}

pub struct Console {
  queue: Arc<IngestQueue>,
  store: LogStore,
  history: CommandHistory,
  /// Retained entries per severity, as of the last tick.
  counts: SeverityCounts,
  /// View index to select and scroll to.
  focus: Option<usize>,
  max_log_count: usize,
  logs_to_remove_after_max_log_count: usize,
  queued_log_limit: usize,
}

impl std::fmt::Debug for Console {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Console")
      .field("queued", &self.queue.len())
      .field("retained", &self.store.uncollapsed_len())
      .field("distinct", &self.store.collapsed_len())
      .field("shown", &self.store.view_len())
      .field("counts", &self.counts)
      .finish()
  }
}

impl Console {
  pub fn new(config: ConsoleConfig) -> Result<Self, ConfigError> {
    config.validate()?;

    let mut store = LogStore::new(config.capture_timestamps);
    store.set_collapse_mode(config.start_collapsed);
    store.set_filter(config.initial_filter);

    Ok(Self {
      queue: Arc::new(IngestQueue::new(&config)),
      store,
      history: CommandHistory::new(config.command_history_size),
      counts: SeverityCounts::default(),
      focus: None,
      max_log_count: config.max_log_count,
      logs_to_remove_after_max_log_count: config.logs_to_remove_after_max_log_count,
      queued_log_limit: config.queued_log_limit,
    })
  }

  pub fn handle(&self) -> ConsoleHandle {
    ConsoleHandle {
      queue: Arc::clone(&self.queue),
    }
  }

  /// One frame of work.
  ///
  /// While `visible` the whole queue is processed; while hidden only the
  /// events above `queued_log_limit` are. Once the store reaches
  /// `max_log_count` the whole overage is evicted, plus
  /// `logs_to_remove_after_max_log_count` entries below the cap, so a tick
  /// never leaves more than `max_log_count - 1` entries retained.
  pub fn tick(&mut self, visible: bool) -> Result<TickReport, ConsoleError> {
    self.queue.clock().advance_frame();

    let queued = self.queue.len();
    let to_process = if visible {
      queued
    } else {
      queued.saturating_sub(self.queued_log_limit)
    };
    let processed = self.drain_and_process(to_process)?;

    let retained = self.store.uncollapsed_len();
    let eviction = if retained >= self.max_log_count {
      let overage = retained - self.max_log_count;
      let count = overage + self.logs_to_remove_after_max_log_count;
      Some(self.evict(count.min(retained))?)
    } else {
      None
    };

    self.counts.add(self.queue.take_pending_counts());

    Ok(TickReport {
      processed,
      eviction,
      view_changed: self.store.take_view_dirty(),
    })
  }

  /// Processes the `max` oldest queued events.
  pub fn drain_and_process(&mut self, max: usize) -> Result<usize, ConsoleError> {
    if max == 0 {
      return Ok(0);
    }

    let store = &mut self.store;
    let mut focus = None;
    let processed = self.queue.drain(max, |item| {
      let outcome = store.process(&item.event, item.timestamp);
      if item.focus {
        focus = outcome.view_index;
      }
    })?;

    if focus.is_some() {
      self.focus = focus;
    }
    tracing::trace!(processed, "Processed queued log events");
    Ok(processed)
  }

  /// Evicts the `count` oldest entries, keeping the focus on the same entry
  /// if it survives.
  pub fn evict(&mut self, count: usize) -> Result<EvictionReport, ConsoleError> {
    let focus = self.focused_entry();
    let report = self.store.evict_oldest(count)?;
    self.counts.subtract(report.removed_by_severity);

    if report.removed_from_view > 0 {
      self.focus = focus.and_then(|(index, id)| self.relocate_after_eviction(index, id));
    }
    Ok(report)
  }

  fn focused_entry(&self) -> Option<(usize, EntryId)> {
    let index = self.focus?;
    Some((index, self.store.view_id(index)?))
  }

  /// Entries only move towards the front on eviction, so the search starts
  /// at the old index and walks back.
  fn relocate_after_eviction(&self, index: usize, id: EntryId) -> Option<usize> {
    if self.store.entry(id).count() == 0 {
      return None;
    }
    let start = index.min(self.store.view_len().checked_sub(1)?);
    (0..=start)
      .rev()
      .find(|&candidate| self.store.view_id(candidate) == Some(id))
  }

  /// Runs `change` on the store and, if it rebuilt the view, points the
  /// focus at the focused entry's new position.
  fn refilter(&mut self, change: impl FnOnce(&mut LogStore) -> bool) -> bool {
    let focus = self.focused_entry();
    if !change(&mut self.store) {
      return false;
    }
    self.focus = focus.and_then(|(_, id)| self.store.view_index_of(id));
    true
  }

  pub fn filtered_view(&self) -> FilteredView<'_> {
    FilteredView { store: &self.store }
  }

  pub fn filter(&self) -> LogFilter {
    self.store.filter()
  }

  pub fn set_filter(&mut self, filter: LogFilter) -> bool {
    self.refilter(|store| store.set_filter(filter))
  }

  /// Flips the given severity bits, e.g. when a filter button is pressed.
  pub fn toggle_filter(&mut self, bits: LogFilter) -> bool {
    let filter = self.store.filter().toggle(bits);
    self.set_filter(filter)
  }

  pub fn search_term(&self) -> &str {
    self.store.search_term()
  }

  pub fn set_search_term(&mut self, term: &str) -> bool {
    self.refilter(|store| store.set_search_term(term))
  }

  pub fn collapse_mode(&self) -> bool {
    self.store.collapse_mode()
  }

  pub fn set_collapse_mode(&mut self, collapse_mode: bool) -> bool {
    self.refilter(|store| store.set_collapse_mode(collapse_mode))
  }

  /// Forgets every processed entry. Queued events are kept.
  pub fn clear(&mut self) {
    self.store.clear();
    self.counts = SeverityCounts::default();
    self.focus = None;
    tracing::debug!("Cleared console logs");
  }

  /// Info, warning and error entries currently retained, as of the last
  /// [`tick`](Self::tick).
  pub fn entry_counts(&self) -> SeverityCounts {
    self.counts
  }

  /// The view index the host should select, if an event asked for it.
  pub fn take_focus_request(&mut self) -> Option<usize> {
    let len = self.store.view_len();
    self.focus.take().filter(|&index| index < len)
  }

  /// Processes everything queued, then renders every retained occurrence
  /// in arrival order.
  pub fn export_all_as_text(&mut self) -> Result<String, ConsoleError> {
    let queued = self.queue.len();
    self.drain_and_process(queued)?;

    let mut out = String::new();
    self.store.export_text(&mut out);
    Ok(out)
  }

  /// Writes [`export_all_as_text`](Self::export_all_as_text) to `path`.
  pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConsoleError> {
    let path = path.as_ref();
    let text = self.export_all_as_text()?;
    export::write_atomically(path, &text)?;
    tracing::info!(path = %path.display(), bytes = text.len(), "Logs saved");
    Ok(())
  }

  /// Saves into `dir` under [`export::default_log_file_name`], returning
  /// the full path.
  pub fn save_to_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<PathBuf, ConsoleError> {
    let path = dir.as_ref().join(export::default_log_file_name());
    self.save_to_file(&path)?;
    Ok(path)
  }

  pub fn history(&self) -> &CommandHistory {
    &self.history
  }

  pub fn history_mut(&mut self) -> &mut CommandHistory {
    &mut self.history
  }

  pub fn store(&self) -> &LogStore {
    &self.store
  }

  pub fn queued(&self) -> usize {
    self.queue.len()
  }
}
