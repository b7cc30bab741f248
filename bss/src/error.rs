use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use bss_graph::{FanOutError, Node, ParseError};

use crate::dag_set::DagSetKind;

/// Errors that abort a benchmark.
#[derive(Debug)]
pub enum Error {
  /// Reading or writing the workspace failed.
  Io(io::Error),
  /// A graph description file could not be parsed.
  Parse { path: PathBuf, error: ParseError },
  /// No graph could be selected for a requested size.
  FanOut(FanOutError),
  /// A build tool could not be started.
  ToolMissing { tool: &'static str, error: io::Error },
  /// A build tool exited unsuccessfully.
  ToolFailed { tool: &'static str, command: String, status: Option<i32>, stderr: String },
  /// Invalidating `node` would leave `dependent`, which depends on it, out of the dirty set.
  UnsupportedTopology { node: Node, dependent: Node },
  /// The benchmark configuration is invalid.
  Config(ConfigError),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::Io(e) => write!(f, "I/O error: {}", e),
      Error::Parse { path, error } => write!(f, "failed to parse {}: {}", path.display(), error),
      Error::FanOut(e) => fmt::Display::fmt(e, f),
      Error::ToolMissing { tool, error } => write!(f, "failed to start {}: {}", tool, error),
      Error::ToolFailed { tool, command, status, stderr } => {
        write!(f, "{} failed", tool)?;
        match status {
          Some(code) => write!(f, " with exit code {}", code)?,
          None => write!(f, " without exit code")?,
        }
        write!(f, " while running `{}`", command)?;
        if !stderr.trim().is_empty() {
          write!(f, ":\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
      Error::UnsupportedTopology { node, dependent } => write!(
        f,
        "unsupported topology: node {} has dependent {} which is not dirty; \
        only nodes whose dependents are all dirty can be invalidated",
        node, dependent
      ),
      Error::Config(e) => fmt::Display::fmt(e, f),
    }
  }
}

impl error::Error for Error {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      Error::Io(e) => Some(e),
      Error::Parse { error, .. } => Some(error),
      Error::FanOut(e) => Some(e),
      Error::ToolMissing { error, .. } => Some(error),
      Error::Config(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for Error {
  #[inline]
  fn from(e: io::Error) -> Self { Self::Io(e) }
}

impl From<FanOutError> for Error {
  #[inline]
  fn from(e: FanOutError) -> Self { Self::FanOut(e) }
}

impl From<ConfigError> for Error {
  #[inline]
  fn from(e: ConfigError) -> Self { Self::Config(e) }
}


/// Invalid benchmark configuration, detected before any measurement starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
  NegativeIterations(i64),
  NegativeWarmupIterations(i64),
  ZeroIterations,
  NoBuilders,
  NoDagSets,
  NoScenarios,
  /// A short name in a selection does not name a known `kind` (builder, scenario, or DAG set).
  UnknownName { kind: &'static str, name: String },
  /// A DAG set was selected, but no parameters were given for it.
  NoDagParameters(DagSetKind),
  /// A parameter of a DAG set does not describe a valid DAG, for example a depth of 0.
  InvalidDagParameter { dag_set: DagSetKind, value: u64 },
  /// The fixed-count incremental scenario was selected without a count.
  MissingIncrementalCount,
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NegativeIterations(n) => write!(f, "iterations must be non-negative, got {}", n),
      ConfigError::NegativeWarmupIterations(n) => write!(f, "warmup iterations must be non-negative, got {}", n),
      ConfigError::ZeroIterations => write!(f, "iterations must be at least 1"),
      ConfigError::NoBuilders => write!(f, "no builders selected"),
      ConfigError::NoDagSets => write!(f, "no DAG sets selected"),
      ConfigError::NoScenarios => write!(f, "no scenarios selected"),
      ConfigError::UnknownName { kind, name } => write!(f, "unknown {} '{}'", kind, name),
      ConfigError::NoDagParameters(kind) => write!(f, "DAG set '{}' was selected without parameters", kind),
      ConfigError::InvalidDagParameter { dag_set, value } => {
        write!(f, "invalid parameter {} for DAG set '{}'", value, dag_set)
      }
      ConfigError::MissingIncrementalCount => write!(f, "the fixed incremental scenario requires an incremental count"),
    }
  }
}

impl error::Error for ConfigError {}
