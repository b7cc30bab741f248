use std::collections::BTreeSet;

use crate::{Dag, Node};

/// Chain of `depth` nodes: node `i` depends on node `i + 1`. Node `1` is the only root, node `depth` the only leaf.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LinearChain {
  depth: u64,
}

impl LinearChain {
  /// Creates a chain of `depth` nodes.
  ///
  /// # Panics
  ///
  /// Panics if `depth` is 0.
  pub fn new(depth: u64) -> Self {
    assert!(depth >= 1, "linear chain must have a depth of at least 1");
    Self { depth }
  }

  #[inline]
  pub fn depth(&self) -> u64 { self.depth }
}

impl Dag for LinearChain {
  fn all_nodes(&self) -> BTreeSet<Node> {
    (1..=self.depth).map(Node).collect()
  }
  #[inline]
  fn root_nodes(&self) -> BTreeSet<Node> {
    BTreeSet::from([Node(1)])
  }
  #[inline]
  fn leaf_nodes(&self) -> BTreeSet<Node> {
    BTreeSet::from([Node(self.depth)])
  }
  fn edges_from(&self, node: Node) -> BTreeSet<Node> {
    assert!(self.contains(node), "node {} is not in {}", node, self.describe());
    if node.0 == self.depth {
      BTreeSet::new()
    } else {
      BTreeSet::from([Node(node.0 + 1)])
    }
  }

  #[inline]
  fn contains(&self, node: Node) -> bool { (1..=self.depth).contains(&node.0) }
  #[inline]
  fn node_count(&self) -> usize { self.depth as usize }

  fn describe(&self) -> String { format!("Linear(depth={})", self.depth) }
}
