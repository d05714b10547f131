#[cfg(test)]
mod __test__ {

  use crate::export::{default_log_file_name, log_file_name, write_atomically};

  use chrono::NaiveDate;
  use std::fs;

  #[test]
  fn test_log_file_name_format() {
    let time = NaiveDate::from_ymd_opt(2024, 3, 5)
      .unwrap()
      .and_hms_opt(7, 8, 9)
      .unwrap();
    assert_eq!(log_file_name(time), "05-03-2024--07-08-09.txt");

    let name = default_log_file_name();
    assert_eq!(name.len(), "dd-mm-YYYY--HH-MM-SS.txt".len());
    assert!(name.ends_with(".txt"));
  }

  #[test]
  fn test_write_atomically_creates_and_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs.txt");

    write_atomically(&path, "first").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "first");

    write_atomically(&path, "second").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    assert!(!dir.path().join("logs.txt.tmp").exists());
  }

  #[test]
  fn test_write_atomically_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("logs.txt");

    assert!(write_atomically(&path, "data").is_err());
    assert!(!path.exists());
  }
}
