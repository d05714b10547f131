#[cfg(test)]
mod __test__ {

  use crate::config::ConsoleConfig;
  use crate::error::ConfigError;
  use crate::event::LogFilter;

  use std::io::Write;

  #[test]
  fn test_defaults() {
    let config = ConsoleConfig::default();

    assert_eq!(config.max_log_count, usize::MAX);
    assert_eq!(config.logs_to_remove_after_max_log_count, 16);
    assert_eq!(config.queued_log_limit, 256);
    assert_eq!(config.max_log_length, 10000);
    assert_eq!(config.command_history_size, 15);
    assert_eq!(config.initial_filter, LogFilter::ALL);
    assert!(!config.capture_timestamps);
    assert!(config.receive_exception);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_json_keeps_defaults() {
    let config = ConsoleConfig::from_json_str(
      r#"{ "capture_timestamps": true, "initial_filter": 6, "receive_info": false }"#,
    )
    .unwrap();

    assert!(config.capture_timestamps);
    assert!(!config.receive_info);
    assert_eq!(config.initial_filter, LogFilter::WARNING | LogFilter::ERROR);
    assert_eq!(config.queued_log_limit, 256);
  }

  #[test]
  fn test_invalid_values_are_rejected() {
    let err = ConsoleConfig::from_json_str(r#"{ "max_log_count": 1 }"#).unwrap_err();
    assert!(matches!(
      err,
      ConfigError::Invalid {
        field: "max_log_count",
        ..
      }
    ));

    let err = ConsoleConfig::from_json_str(r#"{ "max_log_length": 10 }"#).unwrap_err();
    assert!(err.to_string().contains("max_log_length"));

    let err = ConsoleConfig::from_json_str(r#"{ "logs_to_remove_after_max_log_count": 0 }"#)
      .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
  }

  #[test]
  fn test_malformed_json() {
    let err = ConsoleConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "command_history_size": 4, "start_collapsed": true }}"#).unwrap();

    let config = ConsoleConfig::from_file(file.path()).unwrap();
    assert_eq!(config.command_history_size, 4);
    assert!(config.start_collapsed);

    let missing = ConsoleConfig::from_file(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));
  }

  #[test]
  fn test_serde_roundtrip() {
    let config = ConsoleConfig {
      max_log_count: 100,
      capture_timestamps: true,
      ..ConsoleConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(ConsoleConfig::from_json_str(&json).unwrap(), config);
  }
}
