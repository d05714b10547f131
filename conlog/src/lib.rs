//! Log storage and deduplication for in-game consoles.
//!
//! Producers on any thread submit events through a [`ConsoleHandle`]; the
//! thread that owns the [`Console`] drains them once per frame into a store
//! that collapses identical messages, enforces a retention cap and keeps a
//! filtered view ready for display.

pub mod buffer;
pub mod collapse;
pub mod config;
pub mod console;
pub mod dyn_buffer;
pub mod entry;
pub mod error;
pub mod event;
pub mod export;
pub mod history;
pub mod panic_hook;
pub mod queue;
pub mod store;
pub mod timestamp;
pub mod trace_layer;

pub use config::ConsoleConfig;
pub use console::{Console, ConsoleHandle, FilteredView, TickReport};
pub use error::{BufferError, ConfigError, ConsoleError};
pub use event::{LogEvent, LogFilter, Severity, SeverityCounts};
pub use panic_hook::PanicHook;
pub use trace_layer::ConsoleLayer;
