mod __test__;

use std::fmt::Write;

use tracing::{field::Field, Event as TracingEvent, Subscriber};
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

use crate::console::ConsoleHandle;
use crate::event::{LogEvent, Severity};

/// Forwards `tracing` events into a console.
///
/// ERROR maps to [`Severity::Error`], WARN to [`Severity::Warning`] and
/// everything else to [`Severity::Info`]. The stack trace records where the
/// event came from as `target (file:line)`. Events emitted by this crate are
/// skipped so the console never logs its own bookkeeping.
#[derive(Debug, Clone)]
pub struct ConsoleLayer {
  handle: ConsoleHandle,
}

impl ConsoleLayer {
  pub fn new(handle: ConsoleHandle) -> Self {
    Self { handle }
  }
}

impl<S> Layer<S> for ConsoleLayer
where
  S: Subscriber + for<'a> LookupSpan<'a>,
{
  fn on_event(&self, event: &TracingEvent<'_>, _ctx: Context<'_, S>) {
    let metadata = event.metadata();
    if is_own_target(metadata.target()) {
      return;
    }

    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);

    let mut origin = metadata.target().to_string();
    if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
      let _ = write!(origin, " ({}:{})", file, line);
    }

    self.handle.submit_event(LogEvent::new(
      visitor.finish(),
      origin,
      Severity::from(metadata.level()),
    ));
  }
}

fn is_own_target(target: &str) -> bool {
  const CRATE: &str = env!("CARGO_CRATE_NAME");
  target
    .strip_prefix(CRATE)
    .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Collects the `message` field followed by any other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
  message: String,
  fields: String,
}

impl MessageVisitor {
  fn finish(mut self) -> String {
    if self.message.is_empty() {
      return self.fields;
    }
    if !self.fields.is_empty() {
      self.message.push(' ');
      self.message.push_str(&self.fields);
    }
    self.message
  }

  fn push_field(&mut self, field: &Field, value: std::fmt::Arguments<'_>) {
    if !self.fields.is_empty() {
      self.fields.push(' ');
    }
    let _ = write!(self.fields, "{}={}", field.name(), value);
  }
}

impl tracing::field::Visit for MessageVisitor {
  fn record_str(&mut self, field: &Field, value: &str) {
    if field.name() == "message" {
      self.message = value.to_string();
    } else {
      self.push_field(field, format_args!("{:?}", value));
    }
  }

  fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
    if field.name() == "message" {
      self.message = format!("{:?}", value);
    } else {
      self.push_field(field, format_args!("{:?}", value));
    }
  }
}
