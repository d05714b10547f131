use std::sync::Arc;
use std::thread;
use std::time::Instant;

use conlog::event::Severity;
use conlog::{Console, ConsoleConfig};
use rand::Rng;

const PRODUCERS: usize = 8;
const EVENTS_PER_PRODUCER: usize = 100_000;
const DISTINCT_MESSAGES: usize = 2_000;

fn main() {
  let config = ConsoleConfig {
    max_log_count: 50_000,
    logs_to_remove_after_max_log_count: 1_024,
    capture_timestamps: true,
    ..ConsoleConfig::default()
  };
  let mut console = match Console::new(config) {
    Ok(console) => console,
    Err(err) => {
      eprintln!("invalid config: {}", err);
      return;
    },
  };

  let start = Instant::now();
  let done = Arc::new(std::sync::atomic::AtomicUsize::new(0));
  let producers: Vec<_> = (0..PRODUCERS)
    .map(|p| {
      let handle = console.handle();
      let done = Arc::clone(&done);
      thread::spawn(move || {
        let mut rng = rand::rng();
        for _ in 0..EVENTS_PER_PRODUCER {
          let n = rng.random_range(0..DISTINCT_MESSAGES);
          let severity = if n % 50 == 0 { Severity::Error } else { Severity::Info };
          handle.submit(format!("producer {} message {}", p, n), "", severity);
        }
        done.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
      })
    })
    .collect();

  let mut ticks = 0usize;
  let mut processed = 0usize;
  let mut evicted = 0usize;
  while done.load(std::sync::atomic::Ordering::Relaxed) < PRODUCERS || console.queued() > 0 {
    match console.tick(true) {
      Ok(report) => {
        processed += report.processed;
        evicted += report.eviction.map_or(0, |eviction| eviction.removed);
      },
      Err(err) => {
        eprintln!("tick failed: {}", err);
        break;
      },
    }
    ticks += 1;
  }
  for producer in producers {
    let _ = producer.join();
  }

  let elapsed = start.elapsed();
  let submitted = PRODUCERS * EVENTS_PER_PRODUCER;
  let counts = console.entry_counts();

  println!("submitted:   {}", submitted);
  println!("processed:   {}", processed);
  println!("evicted:     {}", evicted);
  println!("ticks:       {}", ticks);
  println!("retained:    {}", console.store().uncollapsed_len());
  println!("distinct:    {}", console.store().collapsed_len());
  println!("counts:      {} info / {} warning / {} error", counts.info, counts.warning, counts.error);
  println!("elapsed:     {:.2?}", elapsed);
  println!(
    "throughput:  {:.0} events/s",
    submitted as f64 / elapsed.as_secs_f64()
  );
}
