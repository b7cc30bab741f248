use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime};

use tempfile::{NamedTempFile, TempDir};

/// Creates a new temporary file that gets cleaned up when dropped.
pub fn create_temp_file() -> NamedTempFile {
  NamedTempFile::new().expect("failed to create temporary file")
}

/// Creates a new temporary directory that gets cleaned up when dropped.
pub fn create_temp_dir() -> TempDir {
  TempDir::new().expect("failed to create temporary directory")
}

/// Writes `contents` to `path` repeatedly until the modification time of the file differs from the one it had before
/// the first write, returning that earlier modification time (the Unix epoch when the file did not exist).
///
/// Used to wait until a later write is distinguishable by modification time alone, which is what Make-like tools
/// compare.
pub fn write_until_modified(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<SystemTime, std::io::Error> {
  let path = path.as_ref();
  let contents = contents.as_ref();
  let modified = bss::stamp::modified(path)?.unwrap_or(SystemTime::UNIX_EPOCH);
  loop {
    fs::write(path, contents)?;
    if Some(modified) != bss::stamp::modified(path)? { break; }
    thread::sleep(Duration::from_millis(1));
  }
  Ok(modified)
}
