use std::collections::BTreeSet;
use std::fmt;

use crate::{Dag, Node};

/// Complete `fan_out`-ary tree with `depth` levels, numbered breadth-first starting at node `1`.
///
/// `UniformFanOut::new(4, 2)` creates 15 nodes: root `1`, leaves `8..=15`, and edges `1 -> 2, 3`, `2 -> 4, 5`, ...,
/// `7 -> 14, 15`. With a fan-out of 1, the tree is identical to a [`LinearChain`](crate::LinearChain) of the same
/// depth.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct UniformFanOut {
  depth: u64,
  fan_out: u64,
  node_count: u64,
  non_leaf_count: u64,
}

impl UniformFanOut {
  /// Creates a tree with `depth` levels where each non-leaf node has `fan_out` children.
  ///
  /// # Panics
  ///
  /// Panics if `depth` or `fan_out` is 0, or if the number of nodes does not fit in a `u64`.
  pub fn new(depth: u64, fan_out: u64) -> Self {
    assert!(depth >= 1, "uniform fan-out tree must have a depth of at least 1");
    assert!(fan_out >= 1, "uniform fan-out tree must have a fan-out of at least 1");
    let Some(node_count) = Self::checked_node_count(depth, fan_out) else {
      panic!("uniform fan-out tree with depth {} and fan-out {} has too many nodes", depth, fan_out);
    };
    // Unwrap OK: a smaller tree never has more nodes.
    let non_leaf_count = Self::checked_node_count(depth - 1, fan_out).unwrap();
    Self { depth, fan_out, node_count, non_leaf_count }
  }

  #[inline]
  pub fn depth(&self) -> u64 { self.depth }
  #[inline]
  pub fn fan_out(&self) -> u64 { self.fan_out }

  /// Returns the number of nodes in a tree with `depth` levels and `fan_out` children per node, or `None` if that
  /// does not fit in a `u64`.
  pub fn checked_node_count(depth: u64, fan_out: u64) -> Option<u64> {
    if fan_out == 1 {
      Some(depth)
    } else {
      let exponent = u32::try_from(depth).ok()?;
      Some((fan_out.checked_pow(exponent)? - 1) / (fan_out - 1))
    }
  }

  #[inline]
  fn first_child(&self, node: u64) -> u64 {
    (node - 1) * self.fan_out + 2
  }
}

impl Dag for UniformFanOut {
  fn all_nodes(&self) -> BTreeSet<Node> {
    (1..=self.node_count).map(Node).collect()
  }
  #[inline]
  fn root_nodes(&self) -> BTreeSet<Node> {
    BTreeSet::from([Node(1)])
  }
  fn leaf_nodes(&self) -> BTreeSet<Node> {
    (self.non_leaf_count + 1..=self.node_count).map(Node).collect()
  }
  fn edges_from(&self, node: Node) -> BTreeSet<Node> {
    assert!(self.contains(node), "node {} is not in {}", node, self.describe());
    if node.0 > self.non_leaf_count {
      BTreeSet::new()
    } else {
      (self.first_child(node.0)..self.first_child(node.0 + 1)).map(Node).collect()
    }
  }

  #[inline]
  fn contains(&self, node: Node) -> bool { (1..=self.node_count).contains(&node.0) }
  #[inline]
  fn node_count(&self) -> usize { self.node_count as usize }

  fn describe(&self) -> String { format!("UniformFanOut(depth={}, fan_out={})", self.depth, self.fan_out) }
}


/// Size of a square [`UniformFanOut`] tree (depth equals fan-out) selected by [`node_count_for_fan_out`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FanOutSize {
  pub depth: u64,
  pub fan_out: u64,
  pub node_count: u64,
  pub requested_node_count: u64,
}

impl FanOutSize {
  /// Returns whether the tree has exactly the requested number of nodes.
  #[inline]
  pub fn is_exact(&self) -> bool { self.node_count == self.requested_node_count }

  #[inline]
  pub fn create_dag(&self) -> UniformFanOut { UniformFanOut::new(self.depth, self.fan_out) }
}

/// Failure to select a tree size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FanOutError {
  /// No tree has fewer than one node.
  ZeroNodes,
}

impl fmt::Display for FanOutError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FanOutError::ZeroNodes => write!(f, "cannot create a uniform fan-out tree with 0 nodes"),
    }
  }
}

impl std::error::Error for FanOutError {}

/// Selects the square uniform fan-out tree (depth equals fan-out) that has `target` nodes. If no square tree has
/// exactly `target` nodes, the largest square tree with fewer nodes is selected instead, which can be detected with
/// [`FanOutSize::is_exact`].
pub fn node_count_for_fan_out(target: u64) -> Result<FanOutSize, FanOutError> {
  if target == 0 {
    return Err(FanOutError::ZeroNodes);
  }
  let mut best = FanOutSize { depth: 1, fan_out: 1, node_count: 1, requested_node_count: target };
  for size in 2.. {
    match UniformFanOut::checked_node_count(size, size) {
      Some(node_count) if node_count <= target => {
        best = FanOutSize { depth: size, fan_out: size, node_count, requested_node_count: target };
        if node_count == target { break; }
      }
      _ => break,
    }
  }
  Ok(best)
}


#[cfg(test)]
mod test {
  use assert_matches::assert_matches;
  use rstest::rstest;

  use crate::{LinearChain, same_graph, validate};

  use super::*;

  fn nodes(range: impl IntoIterator<Item=u64>) -> BTreeSet<Node> {
    range.into_iter().map(Node).collect()
  }

  #[test]
  fn test_fan_out_1_equals_linear() {
    for depth in 1..=20 {
      let dag = UniformFanOut::new(depth, 1);
      let linear = LinearChain::new(depth);
      validate(&dag);
      validate(&linear);
      assert!(same_graph(&dag, &linear), "fan-out 1 with depth {} differs from linear chain", depth);
      assert_eq!(dag.root_nodes(), linear.root_nodes());
      assert_eq!(dag.leaf_nodes(), linear.leaf_nodes());
    }
  }

  #[test]
  fn test_depth_1() {
    for fan_out in 1..10 {
      let dag = UniformFanOut::new(1, fan_out);
      validate(&dag);
      assert_eq!(dag.root_nodes(), nodes([1]));
      assert_eq!(dag.all_nodes(), nodes([1]));
      assert_eq!(dag.leaf_nodes(), nodes([1]));
      assert!(dag.edges_from(Node(1)).is_empty());
    }
  }

  #[rstest]
  #[case(2, 2, 3)]
  #[case(3, 2, 7)]
  #[case(4, 2, 15)]
  #[case(2, 3, 4)]
  #[case(3, 3, 13)]
  #[case(5, 1, 5)]
  fn test_node_count_matches_enumeration(#[case] depth: u64, #[case] fan_out: u64, #[case] expected: u64) {
    let dag = UniformFanOut::new(depth, fan_out);
    validate(&dag);
    assert_eq!(UniformFanOut::checked_node_count(depth, fan_out), Some(expected));
    assert_eq!(dag.all_nodes(), nodes(1..=expected));
    assert_eq!(dag.node_count() as u64, expected);
  }

  #[test]
  fn test_depth_4_fan_out_2() {
    let dag = UniformFanOut::new(4, 2);
    assert_eq!(dag.root_nodes(), nodes([1]));
    assert_eq!(dag.leaf_nodes(), nodes(8..=15));
    assert_eq!(dag.edges_from(Node(1)), nodes([2, 3]));
    assert_eq!(dag.edges_from(Node(2)), nodes([4, 5]));
    assert_eq!(dag.edges_from(Node(3)), nodes([6, 7]));
    assert_eq!(dag.edges_from(Node(4)), nodes([8, 9]));
    assert_eq!(dag.edges_from(Node(5)), nodes([10, 11]));
    assert_eq!(dag.edges_from(Node(6)), nodes([12, 13]));
    assert_eq!(dag.edges_from(Node(7)), nodes([14, 15]));
    for leaf in 8..=15 {
      assert!(dag.edges_from(Node(leaf)).is_empty());
    }
    assert_eq!(dag.edges_to(Node(13)), nodes([6]));
  }

  #[test]
  fn test_depth_3_fan_out_3() {
    let dag = UniformFanOut::new(3, 3);
    assert_eq!(dag.leaf_nodes(), nodes(5..=13));
    assert_eq!(dag.edges_from(Node(1)), nodes([2, 3, 4]));
    assert_eq!(dag.edges_from(Node(2)), nodes([5, 6, 7]));
    assert_eq!(dag.edges_from(Node(3)), nodes([8, 9, 10]));
    assert_eq!(dag.edges_from(Node(4)), nodes([11, 12, 13]));
  }

  #[test]
  #[should_panic(expected = "is not in")]
  fn test_edges_from_unknown_node_panics() {
    UniformFanOut::new(2, 2).edges_from(Node(4));
  }

  #[rstest]
  #[case(1, 1)]
  #[case(3, 2)]
  #[case(13, 3)]
  #[case(85, 4)]
  #[case(781, 5)]
  fn test_node_count_for_fan_out_exact(#[case] target: u64, #[case] size: u64) {
    let fan_out_size = node_count_for_fan_out(target).unwrap();
    assert!(fan_out_size.is_exact());
    assert_eq!(fan_out_size.depth, size);
    assert_eq!(fan_out_size.fan_out, size);
    assert_eq!(fan_out_size.create_dag().node_count() as u64, target);
  }

  #[rstest]
  #[case(2, 1)]
  #[case(12, 3)]
  #[case(100, 85)]
  #[case(9000, 781)]
  fn test_node_count_for_fan_out_substitutes_smaller(#[case] target: u64, #[case] substituted: u64) {
    let fan_out_size = node_count_for_fan_out(target).unwrap();
    assert!(!fan_out_size.is_exact());
    assert_eq!(fan_out_size.node_count, substituted);
    assert_eq!(fan_out_size.requested_node_count, target);
  }

  #[test]
  fn test_node_count_for_fan_out_zero() {
    assert_matches!(node_count_for_fan_out(0), Err(FanOutError::ZeroNodes));
  }

  #[test]
  fn test_node_count_for_fan_out_huge() {
    let fan_out_size = node_count_for_fan_out(u64::MAX).unwrap();
    assert!(fan_out_size.node_count < u64::MAX);
    assert_eq!(fan_out_size.depth, fan_out_size.fan_out);
  }
}
