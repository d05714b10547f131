//! # Log Entry Store
//!
//! Main-thread storage for processed log events. Three sequences of
//! [`EntryId`] handles are kept over one [`EntryPool`]:
//!
//! - **uncollapsed**: one handle per occurrence, in arrival order
//! - **collapsed**: one handle per distinct entry, in first-arrival order
//! - **view**: the filtered projection of one of the above, depending on
//!   collapse mode, severity mask and search term
//!
//! When timestamps are captured, each sequence carries a parallel buffer of
//! [`LogTimestamp`]s that is trimmed and compacted in lockstep with it.
//!
//! A handle in the collapsed store is removed (and its entry recycled) only
//! after the last of its occurrences has left the uncollapsed store, and it
//! leaves the view no later than that.


use crate::collapse::{content_hash, CollapseMap};
use crate::dyn_buffer::{Compaction, DynamicRingBuffer};
use crate::entry::{EntryId, EntryPool, LogEntry};
use crate::error::BufferError;
use crate::event::{LogEvent, LogFilter, SeverityCounts};
use crate::timestamp::LogTimestamp;

/// Result of [`LogStore::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
  pub id: EntryId,
  /// `true` if the content was already known.
  pub is_duplicate: bool,
  /// Where the occurrence shows up in the view, if it does.
  pub view_index: Option<usize>,
}

/// Result of [`LogStore::evict_oldest`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvictionReport {
  /// Occurrences removed from the uncollapsed store.
  pub removed: usize,
  /// Handles removed from the view.
  pub removed_from_view: usize,
  /// Distinct entries whose last occurrence was removed.
  pub collapsed_removed: usize,
  /// The removed occurrences bucketed by their entry's severity.
  pub removed_by_severity: SeverityCounts,
}

/// One row of the view.
#[derive(Debug, Clone, Copy)]
pub struct ViewItem<'a> {
  pub id: EntryId,
  pub entry: &'a LogEntry,
  /// `None` when timestamps are not captured.
  pub timestamp: Option<LogTimestamp>,
}

/// Drops collapsed handles whose entry has no occurrences left, recycling
/// the entry and keeping `collapsed_index` of the survivors current.
struct CollapsedEviction<'a> {
  pool: &'a mut EntryPool,
  map: &'a mut CollapseMap,
}

impl Compaction<EntryId> for CollapsedEviction<'_> {
  fn should_remove(&mut self, id: &EntryId) -> bool {
    if self.pool.get(*id).count() > 0 {
      return false;
    }
    self.map.remove(self.pool, *id);
    self.pool.release(*id);
    true
  }

  fn index_changed(&mut self, id: &EntryId, new_index: usize) {
    self.pool.get_mut(*id).set_collapsed_index(new_index);
  }
}

fn timestamp_buffer(enabled: bool) -> Option<DynamicRingBuffer<LogTimestamp>> {
  enabled.then(DynamicRingBuffer::new)
}

#[derive(Debug)]
pub struct LogStore {
  pool: EntryPool,
  map: CollapseMap,

  collapsed: DynamicRingBuffer<EntryId>,
  collapsed_timestamps: Option<DynamicRingBuffer<LogTimestamp>>,
  uncollapsed: DynamicRingBuffer<EntryId>,
  uncollapsed_timestamps: Option<DynamicRingBuffer<LogTimestamp>>,
  view: DynamicRingBuffer<EntryId>,
  view_timestamps: Option<DynamicRingBuffer<LogTimestamp>>,

  collapse_mode: bool,
  filter: LogFilter,
  /// Trimmed; empty means search is off.
  search_term: String,
  view_dirty: bool,
}

impl LogStore {
  pub fn new(capture_timestamps: bool) -> Self {
    Self {
      pool: EntryPool::new(),
      map: CollapseMap::new(),
      collapsed: DynamicRingBuffer::new(),
      collapsed_timestamps: timestamp_buffer(capture_timestamps),
      uncollapsed: DynamicRingBuffer::new(),
      uncollapsed_timestamps: timestamp_buffer(capture_timestamps),
      view: DynamicRingBuffer::new(),
      view_timestamps: timestamp_buffer(capture_timestamps),
      collapse_mode: false,
      filter: LogFilter::ALL,
      search_term: String::new(),
      view_dirty: false,
    }
  }

  #[inline]
  fn in_search_mode(&self) -> bool {
    !self.search_term.is_empty()
  }

  /// Whether the view is a plain copy of its source store.
  #[inline]
  fn view_mirrors_source(&self) -> bool {
    self.filter.is_all() && !self.in_search_mode()
  }

  fn passes_view_filter(&self, entry: &LogEntry) -> bool {
    self.filter.allows(entry.severity())
      && (!self.in_search_mode() || entry.matches_search_term(&self.search_term))
  }

  /// Records one occurrence of `event`.
  ///
  /// Novel content gets a fresh entry appended to the collapsed store; a
  /// duplicate bumps the existing entry's count and refreshes its collapsed
  /// timestamp. The occurrence always lands in the uncollapsed store. In
  /// collapse mode a duplicate only refreshes its view timestamp, otherwise
  /// the occurrence is appended to the view if it passes the filter.
  pub fn process(&mut self, event: &LogEvent, timestamp: LogTimestamp) -> ProcessOutcome {
    let hash = content_hash(&event.message, &event.stack_trace);
    let existing = self
      .map
      .find_hashed(&self.pool, hash, &event.message, &event.stack_trace);

    let id = match existing {
      Some(id) => {
        let entry = self.pool.get_mut(id);
        entry.increment();
        let collapsed_index = entry.collapsed_index();
        if let Some(timestamps) = self.collapsed_timestamps.as_mut() {
          timestamps[collapsed_index] = timestamp;
        }
        id
      }
      None => {
        let id = self
          .pool
          .acquire(&event.message, &event.stack_trace, event.severity);
        self.pool.get_mut(id).set_collapsed_index(self.collapsed.len());
        self.collapsed.push_back(id);
        self.map.insert_hashed(hash, id);
        if let Some(timestamps) = self.collapsed_timestamps.as_mut() {
          timestamps.push_back(timestamp);
        }
        id
      }
    };
    let is_duplicate = existing.is_some();

    self.uncollapsed.push_back(id);
    if let Some(timestamps) = self.uncollapsed_timestamps.as_mut() {
      timestamps.push_back(timestamp);
    }

    let view_index = if self.collapse_mode && is_duplicate {
      let index = if self.view_mirrors_source() {
        Some(self.pool.get(id).collapsed_index())
      } else {
        self.view.index_of(&id)
      };
      if let (Some(index), Some(timestamps)) = (index, self.view_timestamps.as_mut()) {
        timestamps[index] = timestamp;
      }
      index
    } else if self.passes_view_filter(self.pool.get(id)) {
      self.view.push_back(id);
      if let Some(timestamps) = self.view_timestamps.as_mut() {
        timestamps.push_back(timestamp);
      }
      self.view_dirty = true;
      Some(self.view.len() - 1)
    } else {
      None
    };

    ProcessOutcome {
      id,
      is_duplicate,
      view_index,
    }
  }

  /// Removes the `count` oldest occurrences.
  ///
  /// Entries left without occurrences are dropped from the view and the
  /// collapsed store, forgotten by the collapse map and returned to the
  /// pool, in that order.
  pub fn evict_oldest(&mut self, count: usize) -> Result<EvictionReport, BufferError> {
    let mut report = EvictionReport {
      removed: count,
      ..EvictionReport::default()
    };
    if count == 0 {
      return Ok(report);
    }

    let mut any_exhausted = false;
    let collapse_mode = self.collapse_mode;
    let pool = &mut self.pool;
    let view = &self.view;
    self.uncollapsed.trim_start_with(count, |id| {
      let entry = pool.get_mut(id);
      if entry.decrement() == 0 {
        any_exhausted = true;
      }
      // Uncollapsed view entries are a subsequence of this store, so the
      // oldest occurrences are at the view's front.
      if !collapse_mode && view.get(report.removed_from_view) == Some(&id) {
        report.removed_from_view += 1;
      }
      report.removed_by_severity.record(entry.severity());
    })?;

    if let Some(timestamps) = self.uncollapsed_timestamps.as_mut() {
      timestamps.trim_start(count)?;
    }

    if report.removed_from_view > 0 {
      self.view.trim_start(report.removed_from_view)?;
      if let Some(timestamps) = self.view_timestamps.as_mut() {
        timestamps.trim_start(report.removed_from_view)?;
      }
    }

    if any_exhausted {
      if collapse_mode {
        let pool = &self.pool;
        let mut exhausted = |id: &EntryId| pool.get(*id).count() == 0;
        report.removed_from_view = match self.view_timestamps.as_mut() {
          Some(timestamps) => self.view.remove_all_synced(&mut exhausted, timestamps)?,
          None => self.view.remove_all(&mut exhausted),
        };
      }

      let mut eviction = CollapsedEviction {
        pool: &mut self.pool,
        map: &mut self.map,
      };
      report.collapsed_removed = match self.collapsed_timestamps.as_mut() {
        Some(timestamps) => self.collapsed.remove_all_synced(&mut eviction, timestamps)?,
        None => self.collapsed.remove_all(&mut eviction),
      };
    }

    if report.removed_from_view > 0 {
      self.view_dirty = true;
    }

    tracing::debug!(
      removed = report.removed,
      removed_from_view = report.removed_from_view,
      collapsed_removed = report.collapsed_removed,
      "Evicted oldest log entries"
    );
    Ok(report)
  }

  /// Recomputes the view from the collapsed or uncollapsed store.
  pub fn rebuild(&mut self) {
    let Self {
      pool,
      collapsed,
      collapsed_timestamps,
      uncollapsed,
      uncollapsed_timestamps,
      view,
      view_timestamps,
      collapse_mode,
      filter,
      search_term,
      view_dirty,
      ..
    } = self;

    view.clear();
    if let Some(timestamps) = view_timestamps.as_mut() {
      timestamps.clear();
    }
    *view_dirty = true;

    if filter.is_none() {
      return;
    }

    let (source, source_timestamps) = if *collapse_mode {
      (&*collapsed, collapsed_timestamps.as_ref())
    } else {
      (&*uncollapsed, uncollapsed_timestamps.as_ref())
    };

    if filter.is_all() && search_term.is_empty() {
      view.extend_from(source);
      if let (Some(timestamps), Some(source_timestamps)) =
        (view_timestamps.as_mut(), source_timestamps)
      {
        timestamps.extend_from(source_timestamps);
      }
    } else {
      for (index, id) in source.iter().enumerate() {
        let entry = pool.get(*id);
        if !filter.allows(entry.severity())
          || (!search_term.is_empty() && !entry.matches_search_term(search_term.as_str()))
        {
          continue;
        }
        view.push_back(*id);
        if let (Some(timestamps), Some(source_timestamps)) =
          (view_timestamps.as_mut(), source_timestamps)
        {
          timestamps.push_back(source_timestamps[index]);
        }
      }
    }

    tracing::debug!(
      collapse_mode = *collapse_mode,
      filter = filter.bits(),
      shown = view.len(),
      "Rebuilt log view"
    );
  }

  /// Returns `true` (and rebuilds) if the mask changed.
  pub fn set_filter(&mut self, filter: LogFilter) -> bool {
    if self.filter == filter {
      return false;
    }
    self.filter = filter;
    self.rebuild();
    true
  }

  /// Returns `true` (and rebuilds) if the trimmed term differs from the
  /// current one. An empty term turns search off.
  pub fn set_search_term(&mut self, term: &str) -> bool {
    let term = term.trim();
    if self.search_term == term {
      return false;
    }
    self.search_term.clear();
    self.search_term.push_str(term);
    self.rebuild();
    true
  }

  /// Returns `true` (and rebuilds) if the mode changed.
  pub fn set_collapse_mode(&mut self, collapse_mode: bool) -> bool {
    if self.collapse_mode == collapse_mode {
      return false;
    }
    self.collapse_mode = collapse_mode;
    self.rebuild();
    true
  }

  /// Empties every store and returns all entries to the pool.
  pub fn clear(&mut self) {
    for id in self.collapsed.iter() {
      self.pool.release(*id);
    }

    self.map.clear();
    self.collapsed.clear();
    self.uncollapsed.clear();
    self.view.clear();
    for timestamps in [
      &mut self.collapsed_timestamps,
      &mut self.uncollapsed_timestamps,
      &mut self.view_timestamps,
    ]
    .into_iter()
    .flatten()
    {
      timestamps.clear();
    }
    self.view_dirty = true;
  }

  /// Appends every retained occurrence, oldest first, as
  /// `[HH:MM:SS]: message\nstack_trace\n\n`. The time prefix is only written
  /// when timestamps are captured.
  pub fn export_text(&self, out: &mut String) {
    let mut capacity = 0;
    for id in self.uncollapsed.iter() {
      let entry = self.pool.get(*id);
      capacity += entry.message().len() + entry.stack_trace().len() + 3;
    }
    if self.uncollapsed_timestamps.is_some() {
      capacity += self.uncollapsed.len() * 12;
    }
    out.reserve(capacity);

    for (index, id) in self.uncollapsed.iter().enumerate() {
      if let Some(timestamps) = self.uncollapsed_timestamps.as_ref() {
        out.push('[');
        timestamps[index].append_time(out);
        out.push_str("]: ");
      }

      let entry = self.pool.get(*id);
      out.push_str(entry.message());
      out.push('\n');
      out.push_str(entry.stack_trace());
      out.push_str("\n\n");
    }
  }

  pub fn view_len(&self) -> usize {
    self.view.len()
  }

  pub fn view_id(&self, index: usize) -> Option<EntryId> {
    self.view.get(index).copied()
  }

  pub fn view_item(&self, index: usize) -> Option<ViewItem<'_>> {
    let id = *self.view.get(index)?;
    Some(ViewItem {
      id,
      entry: self.pool.get(id),
      timestamp: self
        .view_timestamps
        .as_ref()
        .and_then(|timestamps| timestamps.get(index))
        .copied(),
    })
  }

  /// Position of `id` in the view.
  pub fn view_index_of(&self, id: EntryId) -> Option<usize> {
    self.view.index_of(&id)
  }

  /// Returns whether the view changed since the last call.
  pub fn take_view_dirty(&mut self) -> bool {
    std::mem::take(&mut self.view_dirty)
  }

  pub fn entry(&self, id: EntryId) -> &LogEntry {
    self.pool.get(id)
  }

  pub fn uncollapsed_len(&self) -> usize {
    self.uncollapsed.len()
  }

  pub fn collapsed_len(&self) -> usize {
    self.collapsed.len()
  }

  pub fn collapsed_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
    self.collapsed.iter().copied()
  }

  pub fn uncollapsed_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
    self.uncollapsed.iter().copied()
  }

  pub fn pool(&self) -> &EntryPool {
    &self.pool
  }

  /// Looks up the canonical entry for this content.
  pub fn find(&self, message: &str, stack_trace: &str) -> Option<EntryId> {
    self.map.find(&self.pool, message, stack_trace)
  }

  pub fn collapse_mode(&self) -> bool {
    self.collapse_mode
  }

  pub fn filter(&self) -> LogFilter {
    self.filter
  }

  pub fn search_term(&self) -> &str {
    &self.search_term
  }

  pub fn captures_timestamps(&self) -> bool {
    self.uncollapsed_timestamps.is_some()
  }
}
