use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::io;

use crate::{Dag, Node};

/// Checks that `dag` satisfies all [`Dag`] invariants, walking from the root nodes with a worklist.
///
/// # Panics
///
/// Panics on the first violated invariant. A violation is a bug in the [`Dag`] implementation.
pub fn validate<D: Dag + ?Sized>(dag: &D) {
  let all_nodes = dag.all_nodes();
  let leaf_nodes = dag.leaf_nodes();
  let root_nodes = dag.root_nodes();
  assert!(root_nodes.is_subset(&all_nodes), "root nodes of {} are not all in all_nodes()", dag.describe());
  assert!(leaf_nodes.is_subset(&all_nodes), "leaf nodes of {} are not all in all_nodes()", dag.describe());

  let mut visited = HashSet::with_capacity(all_nodes.len());
  let mut queue = root_nodes.clone();
  while let Some(node) = queue.pop_first() {
    assert!(all_nodes.contains(&node), "node {} is reachable from a root, but not in all_nodes()", node);
    assert!(visited.insert(node), "node {} was visited more than once", node);
    let edges = dag.edges_from(node);
    if edges.is_empty() {
      assert!(leaf_nodes.contains(&node), "node {} has no outgoing edges, but is not a leaf node", node);
      continue;
    }
    assert!(!leaf_nodes.contains(&node), "node {} has outgoing edges, but is a leaf node", node);
    for edge_node in edges {
      assert!(!root_nodes.contains(&edge_node), "root node {} is the target of an edge from {}", edge_node, node);
      assert!(all_nodes.contains(&edge_node), "node {} is the target of an edge, but not in all_nodes()", edge_node);
      if !visited.contains(&edge_node) {
        queue.insert(edge_node);
      }
    }
  }

  if let Some(node) = find_cycle(dag) {
    panic!("{} has a cycle through node {}", dag.describe(), node);
  }
}

/// Returns a node on a cycle of `dag`, or `None` if `dag` is acyclic.
#[inline]
pub fn find_cycle<D: Dag + ?Sized>(dag: &D) -> Option<Node> {
  node_levels(dag).err()
}

/// Groups the nodes of `dag` into levels: leaves are at level 0, and every other node is one level above its highest
/// dependency. The returned vector is indexed by level.
///
/// Runs in time linear in the number of nodes and edges, using an explicit stack instead of recursion.
///
/// # Panics
///
/// Panics if `dag` has a cycle.
pub fn topologically_leveled<D: Dag + ?Sized>(dag: &D) -> Vec<BTreeSet<Node>> {
  let levels = match node_levels(dag) {
    Ok(levels) => levels,
    Err(node) => panic!("{} has a cycle through node {}", dag.describe(), node),
  };
  let level_count = levels.values().max().map_or(0, |max| max + 1);
  let mut leveled = vec![BTreeSet::new(); level_count];
  for (node, level) in levels {
    leveled[level].insert(node);
  }
  leveled
}

/// Computes the level of every node, or returns a node on a cycle.
fn node_levels<D: Dag + ?Sized>(dag: &D) -> Result<HashMap<Node, usize>, Node> {
  let mut levels = HashMap::new();
  let mut in_progress = HashSet::new();
  let mut stack = Vec::new();
  for start in dag.all_nodes() {
    if levels.contains_key(&start) { continue; }
    stack.push((start, false));
    while let Some((node, dependencies_leveled)) = stack.pop() {
      if levels.contains_key(&node) { continue; }
      let dependencies = dag.edges_from(node);
      if dependencies_leveled {
        let level = dependencies.iter().map(|d| levels[d] + 1).max().unwrap_or(0);
        in_progress.remove(&node);
        levels.insert(node, level);
        continue;
      }
      // Everything pushed on top of an in-progress node is one of its dependencies; seeing it again is a cycle.
      if !in_progress.insert(node) {
        return Err(node);
      }
      stack.push((node, true));
      stack.extend(dependencies.into_iter().filter(|d| !levels.contains_key(d)).map(|d| (d, false)));
    }
  }
  Ok(levels)
}

/// Lists every node reachable from `starting_nodes` (the root nodes if `None`) together with its dependencies, in
/// breadth-first order.
pub fn flatten<D: Dag + ?Sized>(dag: &D, starting_nodes: Option<BTreeSet<Node>>) -> Vec<(Node, BTreeSet<Node>)> {
  let mut queue: VecDeque<_> = starting_nodes.unwrap_or_else(|| dag.root_nodes()).into_iter().collect();
  let mut visited: HashSet<_> = queue.iter().copied().collect();
  let mut flattened = Vec::new();
  while let Some(node) = queue.pop_front() {
    let edges = dag.edges_from(node);
    for edge_node in &edges {
      if visited.insert(*edge_node) {
        queue.push_back(*edge_node);
      }
    }
    flattened.push((node, edges));
  }
  flattened
}

/// Checks whether `a` and `b` have the same nodes and the same edges.
pub fn same_graph<A: Dag + ?Sized, B: Dag + ?Sized>(a: &A, b: &B) -> bool {
  let nodes = a.all_nodes();
  nodes == b.all_nodes() && nodes.into_iter().all(|n| a.edges_from(n) == b.edges_from(n))
}

/// Writes a human-readable description of the roots, leaves, and edges of `dag` to `writer`.
pub fn dump<D: Dag + ?Sized>(dag: &D, writer: &mut impl io::Write) -> io::Result<()> {
  fn join(nodes: &BTreeSet<Node>) -> String {
    nodes.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ")
  }
  writeln!(writer, "Dump of {}:", dag.describe())?;
  writeln!(writer, "  root_nodes() = {}", join(&dag.root_nodes()))?;
  writeln!(writer, "  leaf_nodes() = {}", join(&dag.leaf_nodes()))?;
  for (node, edges) in flatten(dag, None) {
    writeln!(writer, "  {} -> {}", node, join(&edges))?;
  }
  Ok(())
}
