use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bss_graph::{Dag, Node};

use crate::builder::Builder;
use crate::error::{ConfigError, Error};
use crate::tracker::Tracker;

pub use clean::Clean;
pub use dirty::select_dirty_nodes;
pub use incremental::{FixedCountIncremental, FullIncremental, NoOpIncremental};

mod clean;
mod dirty;
mod incremental;

/// Prepares a workspace before a timed build.
pub trait Scenario {
  /// Name of the scenario as shown in run records, for example `Full Incremental`.
  fn display_name(&self) -> String;

  /// Prepares `workspace`, which `builder` has already been set up in for `dag`, so that the next build of
  /// `build_targets` measures this scenario.
  fn set_up(
    &self,
    dag: &dyn Dag,
    builder: &dyn Builder,
    build_targets: &BTreeSet<Node>,
    workspace: &mut Workspace,
  ) -> Result<(), Error>;
}

/// Temporary directory of a single build, with the state that scenarios need to prepare it.
pub struct Workspace<'a> {
  pub dir: &'a Path,
  pub seeder: &'a mut LeafSeeder,
  pub tracker: &'a mut dyn Tracker,
}

impl<'a> Workspace<'a> {
  #[inline]
  pub fn new(dir: &'a Path, seeder: &'a mut LeafSeeder, tracker: &'a mut dyn Tracker) -> Self {
    Self { dir, seeder, tracker }
  }

  /// Returns the path of the file of `node`.
  #[inline]
  pub fn node_path(&self, node: Node) -> PathBuf { node_path(self.dir, node) }

  /// Writes fresh contents to the files of all leaf nodes of `dag`.
  pub fn seed_leaves(&mut self, dag: &dyn Dag) -> Result<(), io::Error> {
    let count = self.seeder.seed(dag, self.dir)?;
    self.tracker.leaves_seeded(count, self.seeder.iteration());
    Ok(())
  }

  /// Builds `build_targets` with `builder` without measuring it, then waits until later changes are observable by
  /// modification time.
  pub fn build_untimed(&mut self, builder: &dyn Builder, build_targets: &BTreeSet<Node>) -> Result<(), Error> {
    self.tracker.preliminary_build_start();
    builder.build(build_targets, self.dir)?;
    self.tracker.preliminary_build_end();
    builder.wait_for_filesystem_stamp_granularity();
    Ok(())
  }
}

/// Returns the path of the file of `node` in `dir`.
#[inline]
pub fn node_path(dir: &Path, node: Node) -> PathBuf { dir.join(node.to_string()) }


/// Writes leaf node contents that differ on every write but always have the same size, so that the size of the
/// inputs does not influence timings.
#[derive(Default, Clone, Debug)]
pub struct LeafSeeder {
  iteration: u64,
}

impl LeafSeeder {
  /// Size in bytes of every seeded file.
  pub const CONTENT_LENGTH: usize = 42;

  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Number of files seeded so far.
  #[inline]
  pub fn iteration(&self) -> u64 { self.iteration }

  /// Contents of the file of `node` when seeded at `iteration`: both zero-padded to 20 digits, so that every `u64`
  /// fits.
  #[inline]
  pub fn content(iteration: u64, node: Node) -> String {
    format!("{:020}; {:020}", iteration, node.0)
  }

  /// Writes fresh contents to the file of `node` in `dir`.
  pub fn seed_node(&mut self, node: Node, dir: &Path) -> Result<(), io::Error> {
    self.iteration += 1;
    fs::write(node_path(dir, node), Self::content(self.iteration, node))
  }

  /// Writes fresh contents to the files of all leaf nodes of `dag` in `dir`, returning the number of files written.
  pub fn seed(&mut self, dag: &dyn Dag, dir: &Path) -> Result<usize, io::Error> {
    let leaf_nodes = dag.leaf_nodes();
    for node in &leaf_nodes {
      self.seed_node(*node, dir)?;
    }
    Ok(leaf_nodes.len())
  }
}


/// Short names of the scenarios.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(rename_all = "kebab-case"))]
pub enum ScenarioKind {
  Clean,
  NoOp,
  Fixed,
  Full,
}

impl ScenarioKind {
  pub const ALL: [ScenarioKind; 4] = [ScenarioKind::Clean, ScenarioKind::NoOp, ScenarioKind::Fixed, ScenarioKind::Full];

  #[inline]
  pub fn short_name(&self) -> &'static str {
    match self {
      ScenarioKind::Clean => "clean",
      ScenarioKind::NoOp => "noop",
      ScenarioKind::Fixed => "fixed",
      ScenarioKind::Full => "full",
    }
  }

  /// Creates the scenario. The fixed-count incremental scenario requires `incremental_count`.
  pub fn create(&self, incremental_count: Option<usize>) -> Result<Box<dyn Scenario>, ConfigError> {
    let scenario: Box<dyn Scenario> = match self {
      ScenarioKind::Clean => Box::new(Clean),
      ScenarioKind::NoOp => Box::new(NoOpIncremental),
      ScenarioKind::Fixed => {
        let count = incremental_count.ok_or(ConfigError::MissingIncrementalCount)?;
        Box::new(FixedCountIncremental::new(count))
      }
      ScenarioKind::Full => Box::new(FullIncremental),
    };
    Ok(scenario)
  }
}

impl FromStr for ScenarioKind {
  type Err = ConfigError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter()
      .find(|k| k.short_name() == s)
      .ok_or_else(|| ConfigError::UnknownName { kind: "scenario", name: s.to_string() })
  }
}

impl fmt::Display for ScenarioKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.short_name())
  }
}
