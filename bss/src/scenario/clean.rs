use std::collections::BTreeSet;

use bss_graph::{Dag, Node};

use crate::builder::Builder;
use crate::error::Error;
use crate::scenario::{Scenario, Workspace};

/// Build from scratch: only the leaf nodes exist.
#[derive(Copy, Clone, Default, Debug)]
pub struct Clean;

impl Scenario for Clean {
  #[inline]
  fn display_name(&self) -> String { "Clean".to_string() }

  fn set_up(
    &self,
    dag: &dyn Dag,
    _builder: &dyn Builder,
    _build_targets: &BTreeSet<Node>,
    workspace: &mut Workspace,
  ) -> Result<(), Error> {
    workspace.seed_leaves(dag)?;
    Ok(())
  }
}
