
use std::backtrace::Backtrace;
use std::panic;

use crate::console::ConsoleHandle;
use crate::event::{LogEvent, Severity};

pub struct PanicHook {}

impl PanicHook {
  /// Reports every panic to the console as an [`Severity::Exception`] with
  /// the backtrace as its stack trace, then runs the previously installed
  /// hook.
  ///
  /// The hook never blocks: if the queue is locked (the panicking thread
  /// may hold it) the panic is only reported by the previous hook.
  pub fn install(handle: ConsoleHandle) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
      let payload = info.payload();
      let what = if let Some(text) = payload.downcast_ref::<&str>() {
        *text
      } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
      } else {
        "Box<dyn Any>"
      };

      let message = match info.location() {
        Some(location) => format!("panicked at {}: {}", location, what),
        None => format!("panicked: {}", what),
      };
      let backtrace = Backtrace::force_capture().to_string();

      handle.try_submit(LogEvent::new(message, backtrace, Severity::Exception));
      previous(info);
    }));
  }
}
