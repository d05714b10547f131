//! Writing exported logs to disk.

mod __test__;

use chrono::{Local, NaiveDateTime};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name for a log export created at `time`: `dd-mm-YYYY--HH-MM-SS.txt`.
pub fn log_file_name(time: NaiveDateTime) -> String {
  format!("{}.txt", time.format("%d-%m-%Y--%H-%M-%S"))
}

/// [`log_file_name`] for the current local time.
pub fn default_log_file_name() -> String {
  log_file_name(Local::now().naive_local())
}

/// Writes `contents` to `path` atomically.
///
/// The data goes to `<path>.tmp` first and is synced before being renamed
/// over the destination, so a reader never sees a half-written file and a
/// failed write leaves any previous file untouched.
pub fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
  let mut tmp = path.as_os_str().to_owned();
  tmp.push(".tmp");
  let tmp = PathBuf::from(tmp);

  let written = (|| {
    let mut f = File::create(&tmp)?;
    f.write_all(contents.as_bytes())?;
    f.sync_all()
  })();

  if let Err(err) = written {
    let _ = fs::remove_file(&tmp);
    return Err(err);
  }
  fs::rename(&tmp, path)
}
