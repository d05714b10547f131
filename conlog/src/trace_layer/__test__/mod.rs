#[cfg(test)]
mod tests {
  use crate::config::ConsoleConfig;
  use crate::console::Console;
  use crate::event::Severity;
  use crate::trace_layer::ConsoleLayer;
  use tracing::{error, info, warn};
  use tracing_subscriber::{layer::SubscriberExt, Registry};

  #[test]
  fn test_console_layer_debug() {
    let console = Console::new(ConsoleConfig::default()).unwrap();
    let layer = ConsoleLayer::new(console.handle());

    assert!(std::format!("{:?}", layer.clone()).contains("ConsoleLayer"));
  }

  #[test]
  fn test_console_layer_with_tracing_events() {
    let mut console = Console::new(ConsoleConfig::default()).unwrap();
    let subscriber = Registry::default().with(ConsoleLayer::new(console.handle()));

    tracing::subscriber::with_default(subscriber, || {
      info!(target: "game::net", "Connected");
      warn!(target: "game::net", retries = 3, "Slow handshake");
      error!(target: "game::render", "Shader compile failed");
    });

    console.tick(true).unwrap();
    let view = console.filtered_view();
    assert_eq!(view.len(), 3);

    let connected = view.get(0).unwrap();
    assert_eq!(connected.entry.message(), "Connected");
    assert_eq!(connected.entry.severity(), Severity::Info);
    assert!(connected.entry.stack_trace().starts_with("game::net ("));
    assert!(connected.entry.stack_trace().contains(".rs:"));

    let slow = view.get(1).unwrap();
    assert_eq!(slow.entry.message(), "Slow handshake retries=3");
    assert_eq!(slow.entry.severity(), Severity::Warning);

    let failed = view.get(2).unwrap();
    assert_eq!(failed.entry.severity(), Severity::Error);
    assert!(failed.entry.stack_trace().starts_with("game::render"));
  }

  #[test]
  fn test_console_layer_skips_own_events() {
    let mut console = Console::new(ConsoleConfig::default()).unwrap();
    let subscriber = Registry::default().with(ConsoleLayer::new(console.handle()));

    tracing::subscriber::with_default(subscriber, || {
      info!(target: "conlog::store", "internal");
      info!(target: "app", "external");
    });

    console.tick(true).unwrap();
    assert_eq!(console.filtered_view().len(), 1);
    assert_eq!(console.filtered_view().get(0).unwrap().entry.message(), "external");
  }

  #[test]
  fn test_console_layer_fields_without_message() {
    let mut console = Console::new(ConsoleConfig::default()).unwrap();
    let subscriber = Registry::default().with(ConsoleLayer::new(console.handle()));

    tracing::subscriber::with_default(subscriber, || {
      info!(target: "app", fps = 60, scene = "menu");
    });

    console.tick(true).unwrap();
    assert_eq!(
      console.filtered_view().get(0).unwrap().entry.message(),
      "fps=60 scene=\"menu\""
    );
  }
}
