//! Console settings.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```rust
//! use conlog::config::ConsoleConfig;
//!
//! let config = ConsoleConfig::from_json_str(r#"{ "max_log_count": 500 }"#).unwrap();
//! assert_eq!(config.max_log_count, 500);
//! assert_eq!(config.queued_log_limit, 256);
//! ```

mod __test__;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::event::LogFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
  /// Retained occurrences before the oldest are evicted.
  pub max_log_count: usize,
  /// How many extra entries an eviction pass removes below `max_log_count`.
  pub logs_to_remove_after_max_log_count: usize,
  /// Events left queued while the console is hidden.
  pub queued_log_limit: usize,
  /// Maximum combined length of message and stack trace, in bytes.
  pub max_log_length: usize,
  pub capture_timestamps: bool,
  pub receive_info: bool,
  pub receive_warning: bool,
  pub receive_error: bool,
  /// Covers both assertions and exceptions.
  pub receive_exception: bool,
  pub command_history_size: usize,
  pub start_collapsed: bool,
  pub initial_filter: LogFilter,
}

impl Default for ConsoleConfig {
  fn default() -> Self {
    Self {
      max_log_count: usize::MAX,
      logs_to_remove_after_max_log_count: 16,
      queued_log_limit: 256,
      max_log_length: 10000,
      capture_timestamps: false,
      receive_info: true,
      receive_warning: true,
      receive_error: true,
      receive_exception: true,
      command_history_size: 15,
      start_collapsed: false,
      initial_filter: LogFilter::ALL,
    }
  }
}

impl ConsoleConfig {
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let config: ConsoleConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json_str(&json)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    fn at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
      if value < min {
        return Err(ConfigError::Invalid {
          field,
          reason: format!("must be at least {}, got {}", min, value),
        });
      }
      Ok(())
    }

    at_least("max_log_count", self.max_log_count, 2)?;
    at_least(
      "logs_to_remove_after_max_log_count",
      self.logs_to_remove_after_max_log_count,
      1,
    )?;
    at_least("command_history_size", self.command_history_size, 1)?;
    // Room for both truncation markers.
    at_least("max_log_length", self.max_log_length, 32)?;
    Ok(())
  }
}
