use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use conlog::dyn_buffer::DynamicRingBuffer;
use conlog::event::{LogEvent, LogFilter, Severity};
use conlog::queue::IngestQueue;
use conlog::store::LogStore;
use conlog::timestamp::LogTimestamp;
use conlog::{Console, ConsoleConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn configure_criterion() -> Criterion {
  Criterion::default()
    .sample_size(30)
    .measurement_time(Duration::from_secs(5))
    .warm_up_time(Duration::from_secs(2))
}

/// `count` events drawn from `distinct` possible messages.
fn workload(count: usize, distinct: usize) -> Vec<LogEvent> {
  let mut rng = StdRng::seed_from_u64(0xc0ffee);
  (0..count)
    .map(|_| {
      let n = rng.random_range(0..distinct);
      let severity = match n % 3 {
        0 => Severity::Info,
        1 => Severity::Warning,
        _ => Severity::Error,
      };
      LogEvent::new(format!("Event {} happened", n), "at bench::workload", severity)
    })
    .collect()
}

// ============================================================================
// Buffers
// ============================================================================

fn bench_dyn_buffer(c: &mut Criterion) {
  let mut group = c.benchmark_group("dyn_buffer");

  group.bench_function("push_back_trim_start", |b| {
    b.iter(|| {
      let mut buffer = DynamicRingBuffer::new();
      for i in 0..10_000u32 {
        buffer.push_back(i);
        if buffer.len() > 1_000 {
          let _ = buffer.trim_start(16);
        }
      }
      black_box(buffer.len())
    });
  });

  group.bench_function("remove_all_half", |b| {
    b.iter_batched(
      || (0..10_000u32).collect::<DynamicRingBuffer<u32>>(),
      |mut buffer| black_box(buffer.remove_all(&mut |value: &u32| value % 2 == 0)),
      BatchSize::SmallInput,
    );
  });

  group.finish();
}

// ============================================================================
// Ingestion
// ============================================================================

fn bench_submit(c: &mut Criterion) {
  let mut group = c.benchmark_group("submit");
  let events = workload(10_000, 100);

  for threads in [1usize, 4, 8] {
    group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &threads| {
      b.iter(|| {
        let queue = Arc::new(IngestQueue::new(&ConsoleConfig::default()));
        let per_thread = events.len() / threads;
        let workers: Vec<_> = (0..threads)
          .map(|t| {
            let queue = Arc::clone(&queue);
            let chunk = events[t * per_thread..(t + 1) * per_thread].to_vec();
            thread::spawn(move || {
              for event in chunk {
                queue.submit(event);
              }
            })
          })
          .collect();
        for worker in workers {
          let _ = worker.join();
        }
        black_box(queue.len())
      });
    });
  }

  group.finish();
}

// ============================================================================
// Processing and eviction
// ============================================================================

fn bench_process(c: &mut Criterion) {
  let mut group = c.benchmark_group("process");

  for distinct in [10usize, 1_000, 10_000] {
    let events = workload(10_000, distinct);
    group.bench_with_input(BenchmarkId::new("distinct", distinct), &events, |b, events| {
      b.iter(|| {
        let mut store = LogStore::new(true);
        for event in events {
          store.process(event, LogTimestamp::default());
        }
        black_box(store.collapsed_len())
      });
    });
  }

  group.finish();
}

fn bench_evict(c: &mut Criterion) {
  let mut group = c.benchmark_group("evict");
  let events = workload(20_000, 500);

  for collapse_mode in [false, true] {
    group.bench_with_input(
      BenchmarkId::new("collapse_mode", collapse_mode),
      &collapse_mode,
      |b, &collapse_mode| {
        b.iter_batched(
          || {
            let mut store = LogStore::new(true);
            store.set_collapse_mode(collapse_mode);
            for event in &events {
              store.process(event, LogTimestamp::default());
            }
            store
          },
          |mut store| {
            while store.uncollapsed_len() > 0 {
              let count = store.uncollapsed_len().min(256);
              let _ = store.evict_oldest(count);
            }
            black_box(store.pool().pooled())
          },
          BatchSize::LargeInput,
        );
      },
    );
  }

  group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
  let mut group = c.benchmark_group("rebuild");
  let mut console = Console::new(ConsoleConfig::default()).unwrap();
  let handle = console.handle();
  for event in workload(20_000, 2_000) {
    handle.submit_event(event);
  }
  let _ = console.tick(true);

  group.bench_function("toggle_warning_filter", |b| {
    b.iter(|| {
      console.toggle_filter(LogFilter::WARNING);
      black_box(console.filtered_view().len())
    });
  });

  group.bench_function("search_term", |b| {
    let mut flip = false;
    b.iter(|| {
      flip = !flip;
      console.set_search_term(if flip { "event 1" } else { "" });
      black_box(console.filtered_view().len())
    });
  });

  group.finish();
}

// ============================================================================
// Full tick
// ============================================================================

fn bench_tick(c: &mut Criterion) {
  let mut group = c.benchmark_group("tick");
  let events = workload(1_000, 200);
  let config = ConsoleConfig {
    max_log_count: 5_000,
    capture_timestamps: true,
    ..ConsoleConfig::default()
  };

  for visible in [true, false] {
    group.bench_with_input(BenchmarkId::new("visible", visible), &visible, |b, &visible| {
      let mut console = Console::new(config.clone()).unwrap();
      let handle = console.handle();
      b.iter(|| {
        for event in &events {
          handle.submit_event(event.clone());
        }
        black_box(console.tick(visible).map(|report| report.processed))
      });
    });
  }

  group.finish();
}

criterion_group! {
  name = benches;
  config = configure_criterion();
  targets =
    bench_dyn_buffer,
    bench_submit,
    bench_process,
    bench_evict,
    bench_rebuild,
    bench_tick,
}

criterion_main!(benches);
