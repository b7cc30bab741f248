#![forbid(unsafe_code)]

//! Dependency graphs used to benchmark build systems against each other.
//!
//! A [`Dag`] is a directed acyclic graph of build products. An edge from `x` to `y` means that producing `x` requires
//! `y` as input. Nodes without incoming edges are [roots](Dag::root_nodes): the targets that are requested from a
//! build system. Nodes without outgoing edges are [leaves](Dag::leaf_nodes): files that are supplied externally and
//! never built.
//!
//! Graphs are either generated ([`LinearChain`], [`UniformFanOut`]) or parsed from a DOT-like description
//! ([`DotDag`]). Every implementation must satisfy the invariants checked by [`validate`].
//!
//! ## Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use bss_graph::{Dag, Node, UniformFanOut, topologically_leveled, validate};
//!
//! let dag = UniformFanOut::new(3, 2);
//! validate(&dag);
//!
//! assert_eq!(dag.node_count(), 7);
//! assert_eq!(dag.edges_from(Node(1)), BTreeSet::from([Node(2), Node(3)]));
//!
//! let levels = topologically_leveled(&dag);
//! assert_eq!(levels.len(), 3);
//! assert_eq!(levels[2], BTreeSet::from([Node(1)]));
//! ```

use std::collections::BTreeSet;
use std::fmt;

pub use adjacency::AdjacencyDag;
pub use dot::{DotDag, ParseError, write_dot};
pub use fan_out::{FanOutError, FanOutSize, node_count_for_fan_out, UniformFanOut};
pub use linear::LinearChain;
pub use topo::{dump, find_cycle, flatten, same_graph, topologically_leveled, validate};

mod adjacency;
mod dot;
mod fan_out;
mod linear;
mod topo;


/// A node (identifier) in a [`Dag`].
///
/// Nodes are totally ordered. The decimal rendering of a node (its [`Display`](fmt::Display) implementation) is used as
/// the file name of the node's build output.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Node(pub u64);

impl From<u64> for Node {
  #[inline]
  fn from(id: u64) -> Self { Self(id) }
}

impl fmt::Display for Node {
  #[inline]
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
}


/// Directed acyclic graph of build products.
///
/// All methods must be pure, deterministic, and mutually consistent:
/// - the edge relation is acyclic,
/// - every node reachable from a root is in [`all_nodes`](Self::all_nodes),
/// - a node is a leaf if and only if it has no outgoing edges,
/// - root nodes are never the target of an edge.
///
/// Object-safe trait.
pub trait Dag {
  /// Returns all nodes of this graph.
  fn all_nodes(&self) -> BTreeSet<Node>;
  /// Returns the nodes without incoming edges.
  fn root_nodes(&self) -> BTreeSet<Node>;
  /// Returns the nodes without outgoing edges.
  fn leaf_nodes(&self) -> BTreeSet<Node>;
  /// Returns the nodes that `node` depends on.
  ///
  /// # Panics
  ///
  /// Panics if `node` is not in this graph.
  fn edges_from(&self, node: Node) -> BTreeSet<Node>;

  /// Returns the nodes that depend on `node`, by scanning all nodes of this graph.
  fn edges_to(&self, node: Node) -> BTreeSet<Node> {
    self.all_nodes()
      .into_iter()
      .filter(|n| self.edges_from(*n).contains(&node))
      .collect()
  }

  /// Checks whether `node` is in this graph.
  #[inline]
  fn contains(&self, node: Node) -> bool { self.all_nodes().contains(&node) }

  /// Returns the number of nodes in this graph.
  #[inline]
  fn node_count(&self) -> usize { self.all_nodes().len() }

  /// Short description of this graph, for example `Linear(depth=10)`.
  fn describe(&self) -> String;
}
