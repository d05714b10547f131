#[cfg(test)]
mod __test__ {

  use crate::config::ConsoleConfig;
  use crate::error::ConsoleError;
  use crate::event::{LogEvent, Severity, SeverityCounts};
  use crate::queue::IngestQueue;

  use std::sync::Arc;
  use std::thread;

  fn info(message: &str) -> LogEvent {
    LogEvent::new(message, "", Severity::Info)
  }

  fn messages(queue: &IngestQueue) -> Vec<String> {
    let mut out = Vec::new();
    queue
      .drain(queue.len(), |item| out.push(item.event.message))
      .unwrap();
    out
  }

  #[test]
  fn test_fifo_order() {
    let queue = IngestQueue::new(&ConsoleConfig::default());
    for message in ["a", "b", "c"] {
      assert!(queue.submit(info(message)));
    }

    assert_eq!(queue.len(), 3);
    assert_eq!(messages(&queue), vec!["a", "b", "c"]);
    assert!(queue.is_empty());
    assert!(queue.pop().is_none());
  }

  #[test]
  fn test_queue_enforces_max_log_count() {
    let config = ConsoleConfig {
      max_log_count: 4,
      ..ConsoleConfig::default()
    };
    let queue = IngestQueue::new(&config);
    for i in 0..6 {
      queue.submit(info(&format!("{}", i)));
    }

    // `len + 1 >= max` evicts, so at most max - 1 stay queued.
    assert_eq!(queue.len(), 3);
    assert_eq!(messages(&queue), vec!["3", "4", "5"]);
  }

  #[test]
  fn test_pending_counts_track_evictions() {
    let config = ConsoleConfig {
      max_log_count: 3,
      ..ConsoleConfig::default()
    };
    let queue = IngestQueue::new(&config);
    queue.submit(LogEvent::new("w", "", Severity::Warning));
    queue.submit(LogEvent::new("e", "", Severity::Exception));
    queue.submit(info("i"));

    assert_eq!(
      queue.take_pending_counts(),
      SeverityCounts {
        info: 1,
        warning: 0,
        error: 1
      }
    );
    assert!(queue.take_pending_counts().is_zero());

    queue.submit(info("i2"));
    let pending = queue.take_pending_counts();
    assert_eq!(pending.info, 1);
    assert_eq!(pending.error, -1);
  }

  #[test]
  fn test_drain_out_of_range() {
    let queue = IngestQueue::new(&ConsoleConfig::default());
    queue.submit(info("only"));

    let err = queue.drain(2, |_| {}).unwrap_err();
    assert!(matches!(
      err,
      ConsoleError::DrainOutOfRange {
        requested: 2,
        queued: 1
      }
    ));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.drain(0, |_| {}).unwrap(), 0);
  }

  #[test]
  fn test_receive_switches() {
    let config = ConsoleConfig {
      receive_warning: false,
      ..ConsoleConfig::default()
    };
    let queue = IngestQueue::new(&config);

    assert!(!queue.submit(LogEvent::new("dropped", "", Severity::Warning)));
    assert!(queue.submit(LogEvent::new("kept", "", Severity::Assertion)));

    queue.set_receiving(Severity::Exception, false);
    assert!(!queue.is_receiving(Severity::Assertion));
    assert!(!queue.submit(LogEvent::new("dropped", "", Severity::Assertion)));
    assert_eq!(queue.len(), 1);
  }

  #[test]
  fn test_long_events_are_truncated() {
    let config = ConsoleConfig {
      max_log_length: 64,
      ..ConsoleConfig::default()
    };
    let queue = IngestQueue::new(&config);
    queue.submit(info(&"x".repeat(500)));

    let item = queue.pop().unwrap();
    assert_eq!(item.event.message.len(), 64);
    assert!(item.event.message.ends_with("<truncated>"));
  }

  #[test]
  fn test_timestamps_follow_events() {
    let config = ConsoleConfig {
      capture_timestamps: true,
      ..ConsoleConfig::default()
    };
    let queue = IngestQueue::new(&config);
    queue.submit(info("frame 0"));
    queue.clock().advance_frame();
    queue.submit(info("frame 1"));

    let first = queue.pop().unwrap();
    let second = queue.pop().unwrap();
    assert!(first.timestamp.wall_clock <= second.timestamp.wall_clock);
    #[cfg(feature = "frame-count")]
    {
      assert_eq!(first.timestamp.frame, 0);
      assert_eq!(second.timestamp.frame, 1);
    }
  }

  #[test]
  fn test_adjust_latest() {
    let queue = IngestQueue::new(&ConsoleConfig::default());
    queue.adjust_latest(true, true);

    queue.submit(info("a"));
    queue.submit(LogEvent::new("b", "trace of b", Severity::Error));
    queue.adjust_latest(true, true);
    queue.submit(info("c"));

    let a = queue.pop().unwrap();
    let b = queue.pop().unwrap();
    let c = queue.pop().unwrap();
    assert!(!a.focus);
    assert!(b.focus);
    assert!(b.event.stack_trace.is_empty());
    assert!(!c.focus);
  }

  #[test]
  fn test_auto_expand_target_survives_front_eviction() {
    let config = ConsoleConfig {
      max_log_count: 4,
      ..ConsoleConfig::default()
    };
    let queue = IngestQueue::new(&config);
    queue.submit(info("a"));
    queue.submit(info("target"));
    queue.adjust_latest(true, false);
    queue.submit(info("c"));
    queue.submit(info("d"));

    let first = queue.pop().unwrap();
    assert_eq!(first.event.message, "target");
    assert!(first.focus);
  }

  #[test]
  fn test_concurrent_submitters() {
    let queue = Arc::new(IngestQueue::new(&ConsoleConfig::default()));
    let handles: Vec<_> = (0..4)
      .map(|t| {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
          for i in 0..100 {
            queue.submit(info(&format!("{}-{}", t, i)));
          }
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }

    assert_eq!(queue.len(), 400);
    assert_eq!(queue.take_pending_counts().info, 400);

    // Per-producer order is preserved.
    let drained = messages(&queue);
    for t in 0..4 {
      let prefix = format!("{}-", t);
      let ours: Vec<usize> = drained
        .iter()
        .filter_map(|m| m.strip_prefix(&prefix))
        .map(|n| n.parse().unwrap())
        .collect();
      assert_eq!(ours, (0..100).collect::<Vec<_>>());
    }
  }

  #[test]
  fn test_try_submit() {
    let queue = IngestQueue::new(&ConsoleConfig::default());
    assert!(queue.try_submit(info("from hook")));
    assert_eq!(queue.pop().unwrap().event.message, "from hook");
  }
}
