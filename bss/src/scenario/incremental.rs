use std::collections::BTreeSet;
use std::fs;

use bss_graph::{Dag, Node};

use crate::builder::Builder;
use crate::error::Error;
use crate::scenario::{Scenario, select_dirty_nodes, Workspace};

/// Seeds the leaves and brings all targets up to date, so that an incremental build can follow.
fn build_up_to_date(
  dag: &dyn Dag,
  builder: &dyn Builder,
  build_targets: &BTreeSet<Node>,
  workspace: &mut Workspace,
) -> Result<(), Error> {
  workspace.seed_leaves(dag)?;
  workspace.build_untimed(builder, build_targets)
}

/// Incremental build where nothing changed.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpIncremental;

impl Scenario for NoOpIncremental {
  #[inline]
  fn display_name(&self) -> String { "Empty Incremental".to_string() }

  fn set_up(
    &self,
    dag: &dyn Dag,
    builder: &dyn Builder,
    build_targets: &BTreeSet<Node>,
    workspace: &mut Workspace,
  ) -> Result<(), Error> {
    build_up_to_date(dag, builder, build_targets, workspace)
  }
}

/// Incremental build where a fixed number of non-leaf nodes must be rebuilt. Their outputs are deleted, selected with
/// [`select_dirty_nodes`].
#[derive(Copy, Clone, Debug)]
pub struct FixedCountIncremental {
  count: usize,
}

impl FixedCountIncremental {
  #[inline]
  pub fn new(count: usize) -> Self { Self { count } }

  #[inline]
  pub fn count(&self) -> usize { self.count }
}

impl Scenario for FixedCountIncremental {
  #[inline]
  fn display_name(&self) -> String { format!("{} (Fixed) Incremental", self.count) }

  fn set_up(
    &self,
    dag: &dyn Dag,
    builder: &dyn Builder,
    build_targets: &BTreeSet<Node>,
    workspace: &mut Workspace,
  ) -> Result<(), Error> {
    build_up_to_date(dag, builder, build_targets, workspace)?;
    let dirty_nodes = select_dirty_nodes(dag, build_targets, self.count)?;
    for node in &dirty_nodes {
      fs::remove_file(workspace.node_path(*node))?;
    }
    workspace.tracker.dirty_nodes_selected(&dirty_nodes);
    Ok(())
  }
}

/// Incremental build where every leaf changed, so every non-leaf node must be rebuilt.
#[derive(Copy, Clone, Default, Debug)]
pub struct FullIncremental;

impl Scenario for FullIncremental {
  #[inline]
  fn display_name(&self) -> String { "Full Incremental".to_string() }

  fn set_up(
    &self,
    dag: &dyn Dag,
    builder: &dyn Builder,
    build_targets: &BTreeSet<Node>,
    workspace: &mut Workspace,
  ) -> Result<(), Error> {
    build_up_to_date(dag, builder, build_targets, workspace)?;
    workspace.seed_leaves(dag)?;
    Ok(())
  }
}
