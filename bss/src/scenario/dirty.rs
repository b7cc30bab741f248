use std::collections::{BTreeSet, HashSet, VecDeque};

use bss_graph::{Dag, Node};

use crate::error::Error;

/// Selects up to `count` non-leaf nodes to invalidate before an incremental build of `targets`.
///
/// Non-leaf targets are selected first, in ascending order. Then, dependencies of selected nodes are selected
/// breadth-first, each node's dependencies in ascending order. A dependency is only selected when every node that
/// depends on it is already selected, which guarantees that rebuilding `targets` after deleting the outputs of the
/// selected nodes rebuilds exactly the selected nodes. Selection stops when `count` nodes are selected, or when no
/// more nodes can be reached.
///
/// Returns the selected nodes in selection order, or [`Error::UnsupportedTopology`] when a reachable dependency has a
/// dependent that is not selected.
pub fn select_dirty_nodes(dag: &dyn Dag, targets: &BTreeSet<Node>, count: usize) -> Result<Vec<Node>, Error> {
  let mut selected = Vec::with_capacity(count);
  if count == 0 {
    return Ok(selected);
  }
  let leaf_nodes = dag.leaf_nodes();
  let mut dirty = HashSet::with_capacity(count);

  for target in targets {
    if selected.len() == count { break; }
    if leaf_nodes.contains(target) { continue; }
    if dirty.insert(*target) {
      selected.push(*target);
    }
  }

  let mut queue: VecDeque<_> = selected.iter().copied().collect();
  while let Some(node) = queue.pop_front() {
    for candidate in dag.edges_from(node) {
      if selected.len() == count {
        return Ok(selected);
      }
      if leaf_nodes.contains(&candidate) || dirty.contains(&candidate) { continue; }
      if let Some(dependent) = dag.edges_to(candidate).into_iter().find(|d| !dirty.contains(d)) {
        return Err(Error::UnsupportedTopology { node: candidate, dependent });
      }
      dirty.insert(candidate);
      selected.push(candidate);
      queue.push_back(candidate);
    }
  }
  Ok(selected)
}
