use std::{fs, io};
use std::fs::Metadata;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Resolution of the system clock, which bounds the resolution of every file system.
pub const SYSTEM_CLOCK_RESOLUTION: Duration = Duration::from_millis(20);

/// Family of platforms that share the same set of common file systems.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PlatformFamily {
  /// Linux and other Unix-likes: ext3 (1 s) and ext4 (1 ns).
  Unix,
  /// macOS: HFS+ (1 s).
  MacOs,
  /// Windows: FAT32 (2 s) and NTFS (100 ns).
  Windows,
}

impl PlatformFamily {
  #[inline]
  pub fn current() -> Self {
    if cfg!(target_os = "macos") {
      Self::MacOs
    } else if cfg!(windows) {
      Self::Windows
    } else {
      Self::Unix
    }
  }

  /// Modification time resolutions of the common file systems of this platform family.
  pub fn file_system_resolutions(&self) -> &'static [Duration] {
    const SECOND: Duration = Duration::from_secs(1);
    const UNIX: &[Duration] = &[SECOND, Duration::from_nanos(1)];
    const MACOS: &[Duration] = &[SECOND];
    const WINDOWS: &[Duration] = &[Duration::from_secs(2), Duration::from_nanos(100)];
    match self {
      Self::Unix => UNIX,
      Self::MacOs => MACOS,
      Self::Windows => WINDOWS,
    }
  }

  /// Time to wait so that a file written afterwards is guaranteed to get a later modification time than a file
  /// written before, on any common file system of this platform family.
  pub fn stamp_granularity(&self) -> Duration {
    self.file_system_resolutions().iter().copied().fold(SYSTEM_CLOCK_RESOLUTION, Duration::max)
  }
}

/// Returns [`PlatformFamily::stamp_granularity`] for the current platform.
#[inline]
pub fn filesystem_stamp_granularity() -> Duration {
  PlatformFamily::current().stamp_granularity()
}

/// Gets the metadata for given `path`, returning:
/// - `Ok(Some(metadata))` if a file or directory exists at given path,
/// - `Ok(None)` if no file or directory exists at given path,
/// - `Err(e)` if there was an error getting the metadata for given path.
pub fn metadata(path: impl AsRef<Path>) -> Result<Option<Metadata>, io::Error> {
  match fs::metadata(path) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e),
    Ok(m) => Ok(Some(m))
  }
}

/// Gets the last modification time of the file at `path`, or `None` if it does not exist.
pub fn modified(path: impl AsRef<Path>) -> Result<Option<SystemTime>, io::Error> {
  let Some(metadata) = metadata(path)? else {
    return Ok(None);
  };
  Ok(Some(metadata.modified()?))
}
