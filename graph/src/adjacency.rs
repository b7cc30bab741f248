use std::collections::{BTreeMap, BTreeSet};

use crate::{Dag, Node};

/// [`Dag`] with explicitly stored edges.
///
/// Adding edges never checks for cycles; use [`find_cycle`](crate::find_cycle) or [`validate`](crate::validate) after
/// constructing a graph from untrusted input.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct AdjacencyDag {
  edges: BTreeMap<Node, BTreeSet<Node>>,
}

impl AdjacencyDag {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Creates a graph with given `edges`, where `(x, y)` means that `x` depends on `y`.
  pub fn from_edges(edges: impl IntoIterator<Item=(u64, u64)>) -> Self {
    let mut dag = Self::new();
    for (from, to) in edges {
      dag.add_edge(Node(from), Node(to));
    }
    dag
  }

  /// Adds `node` without edges, if it is not in the graph yet.
  #[inline]
  pub fn add_node(&mut self, node: Node) {
    self.edges.entry(node).or_default();
  }

  /// Adds an edge denoting that `from` depends on `to`, adding both nodes if needed.
  pub fn add_edge(&mut self, from: Node, to: Node) {
    self.add_node(to);
    self.edges.entry(from).or_default().insert(to);
  }
}

impl Dag for AdjacencyDag {
  fn all_nodes(&self) -> BTreeSet<Node> {
    self.edges.keys().copied().collect()
  }
  fn root_nodes(&self) -> BTreeSet<Node> {
    let targets: BTreeSet<_> = self.edges.values().flatten().copied().collect();
    self.edges.keys().copied().filter(|n| !targets.contains(n)).collect()
  }
  fn leaf_nodes(&self) -> BTreeSet<Node> {
    self.edges.iter().filter(|(_, to)| to.is_empty()).map(|(n, _)| *n).collect()
  }
  fn edges_from(&self, node: Node) -> BTreeSet<Node> {
    match self.edges.get(&node) {
      Some(to) => to.clone(),
      None => panic!("node {} is not in {}", node, self.describe()),
    }
  }

  #[inline]
  fn contains(&self, node: Node) -> bool { self.edges.contains_key(&node) }
  #[inline]
  fn node_count(&self) -> usize { self.edges.len() }

  fn describe(&self) -> String { format!("Graph(nodes={})", self.edges.len()) }
}
