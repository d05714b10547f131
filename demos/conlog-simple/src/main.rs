use std::{thread, time::Duration};
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;

use conlog::{Console, ConsoleConfig, ConsoleLayer, LogFilter, PanicHook};

fn main() {
  let config = ConsoleConfig {
    max_log_count: 500,
    logs_to_remove_after_max_log_count: 50,
    capture_timestamps: true,
    ..ConsoleConfig::default()
  };
  let mut console = match Console::new(config) {
    Ok(console) => console,
    Err(err) => {
      eprintln!("invalid console config: {}", err);
      return;
    },
  };

  // Route every tracing event and panic into the console
  let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(console.handle()));
  if tracing::subscriber::set_global_default(subscriber).is_err() {
    eprintln!("a global subscriber is already set");
    return;
  }
  PanicHook::install(console.handle());

  info!("Application started successfully");
  warn!("This is a warning message");
  error!("This is an error message");
  debug!("Debug information");

  simulate_application_work();
  simulate_concurrent_work();

  // A caught panic still shows up in the console as an exception
  let _ = thread::spawn(|| panic!("Simulated worker failure")).join();

  // Nothing is visible until the owner ticks
  while console.queued() > 0 {
    if let Err(err) = console.tick(true) {
      eprintln!("tick failed: {}", err);
      return;
    }
  }

  print_view(&console, "all entries");

  console.set_collapse_mode(true);
  print_view(&console, "collapsed");

  console.set_filter(LogFilter::WARNING | LogFilter::ERROR);
  console.set_search_term("worker");
  print_view(&console, "warnings and errors mentioning 'worker'");

  let counts = console.entry_counts();
  println!(
    "\ncounts: {} info, {} warning, {} error",
    counts.info, counts.warning, counts.error
  );

  console.history_mut().push("save");
  match console.save_to_dir(std::env::temp_dir()) {
    Ok(path) => println!("log written to {}", path.display()),
    Err(err) => eprintln!("failed to save log: {}", err),
  }
}

fn print_view(console: &Console, title: &str) {
  println!("\n== {} ==", title);
  for item in console.filtered_view().iter() {
    let mut line = String::new();
    if let Some(timestamp) = item.timestamp {
      line.push('[');
      timestamp.append_time(&mut line);
      line.push_str("] ");
    }
    line.push_str(item.entry.severity().as_str());
    line.push(' ');
    line.push_str(item.entry.message());
    if console.collapse_mode() {
      line.push_str(&format!(" (x{})", item.entry.count()));
    }
    println!("{}", line);
  }
}

fn simulate_application_work() {
  info!("Starting work simulation");

  for i in 0..10 {
    debug!("Processing item {}", i);

    if i % 3 == 0 {
      warn!("Item {} required special handling", i);
    }

    if i == 7 {
      error!("Encountered an error at item {}, but continuing", i);
    }
  }

  info!("Work simulation completed");
}

fn simulate_concurrent_work() {
  let workers: Vec<_> = (0..4)
    .map(|worker_id| {
      thread::spawn(move || {
        for task in 0..20 {
          // Same text from every worker collapses to one entry
          info!("Worker heartbeat");

          if task % 10 == 0 {
            warn!(worker_id, task, "Worker checkpoint");
          }

          thread::sleep(Duration::from_millis(1));
        }
      })
    })
    .collect();

  for worker in workers {
    let _ = worker.join();
  }
}
