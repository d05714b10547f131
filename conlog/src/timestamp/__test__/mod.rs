#[cfg(test)]
mod __test__ {

  use crate::timestamp::{Clock, LogTimestamp};

  use chrono::NaiveDate;

  #[test]
  fn test_append_time() {
    let timestamp = LogTimestamp {
      wall_clock: NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 5, 7)
        .unwrap(),
      ..LogTimestamp::default()
    };

    let mut out = String::from("[");
    timestamp.append_time(&mut out);
    assert_eq!(out, "[09:05:07");

    let mut full = String::new();
    timestamp.append_full(&mut full);
    assert!(full.starts_with("2024-03-01 09:05:07"));
  }

  #[test]
  fn test_clock_frames() {
    let clock = Clock::new();
    assert_eq!(clock.frame(), 0);
    assert_eq!(clock.advance_frame(), 1);
    assert_eq!(clock.advance_frame(), 2);

    #[cfg(feature = "frame-count")]
    assert_eq!(clock.now().frame, 2);
  }

  #[test]
  fn test_clock_is_monotonic() {
    let clock = Clock::new();
    let first = clock.now();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = clock.now();

    assert!(second.wall_clock > first.wall_clock);
    #[cfg(feature = "elapsed-time")]
    assert!(second.elapsed_seconds > first.elapsed_seconds);
  }
}
