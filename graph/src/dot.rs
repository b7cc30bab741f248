use std::collections::BTreeSet;
use std::fmt;
use std::io;

use hashlink::LinkedHashMap;

use crate::{AdjacencyDag, Dag, find_cycle, Node, validate};

/// [`Dag`] parsed from a restricted, line-oriented subset of the Graphviz DOT language.
///
/// Recognized statements are `name;` which declares a node, and `a -> b;` which declares that `a` depends on `b`.
/// Trailing `[attribute]` lists, the trailing `;`, and double quotes around names are optional. Blank lines, `//`
/// comments, `digraph name {`, `}`, `rankdir=...`, `node ...`, and `edge ...` lines are ignored. Nodes are numbered in
/// the order in which their names first appear, starting at 1.
///
/// Tools that draw arrows from inputs to outputs, such as `ninja -t graph`, produce graphs that parse inverted: their
/// sources become roots and their final outputs become leaves.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DotDag {
  graph: AdjacencyDag,
  names: Vec<String>,
}

/// Failure to parse a [`DotDag`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
  /// Line `line_number` (1-based) is not a node statement, an edge statement, or ignorable.
  MalformedLine { line_number: usize, line: String },
  /// The described graph has a cycle through the node named `name`.
  Cycle { name: String },
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParseError::MalformedLine { line_number, line } => write!(f, "parse error on line {}: {}", line_number, line),
      ParseError::Cycle { name } => write!(f, "graph has a cycle through node {}", name),
    }
  }
}

impl std::error::Error for ParseError {}

enum Statement<'a> {
  Ignored,
  Node(&'a str),
  Edge(&'a str, &'a str),
}

impl DotDag {
  /// Parses `text` into a graph.
  ///
  /// # Errors
  ///
  /// Returns an error on the first malformed line, or when the graph has a cycle.
  pub fn parse(text: &str) -> Result<Self, ParseError> {
    let mut ids: LinkedHashMap<String, Node> = LinkedHashMap::new();
    let mut graph = AdjacencyDag::new();
    let mut node_for = |name: &str, graph: &mut AdjacencyDag| -> Node {
      if let Some(node) = ids.get(name) {
        return *node;
      }
      let node = Node(ids.len() as u64 + 1);
      ids.insert(name.to_string(), node);
      graph.add_node(node);
      node
    };

    for (index, line) in text.lines().enumerate() {
      let malformed = || ParseError::MalformedLine { line_number: index + 1, line: line.to_string() };
      match parse_statement(line).ok_or_else(malformed)? {
        Statement::Ignored => {}
        Statement::Node(name) => {
          node_for(name, &mut graph);
        }
        Statement::Edge(from, to) => {
          let from = node_for(from, &mut graph);
          let to = node_for(to, &mut graph);
          graph.add_edge(from, to);
        }
      }
    }

    let names = ids.into_iter().map(|(name, _)| name).collect();
    let dag = Self { graph, names };
    if let Some(node) = find_cycle(&dag) {
      return Err(ParseError::Cycle { name: dag.name(node).unwrap_or_default().to_string() });
    }
    validate(&dag);
    Ok(dag)
  }

  /// Returns the name that `node` was declared with.
  #[inline]
  pub fn name(&self, node: Node) -> Option<&str> {
    let index = usize::try_from(node.0).ok()?.checked_sub(1)?;
    self.names.get(index).map(|n| n.as_str())
  }
}

impl Dag for DotDag {
  #[inline]
  fn all_nodes(&self) -> BTreeSet<Node> { self.graph.all_nodes() }
  #[inline]
  fn root_nodes(&self) -> BTreeSet<Node> { self.graph.root_nodes() }
  #[inline]
  fn leaf_nodes(&self) -> BTreeSet<Node> { self.graph.leaf_nodes() }
  #[inline]
  fn edges_from(&self, node: Node) -> BTreeSet<Node> { self.graph.edges_from(node) }
  #[inline]
  fn contains(&self, node: Node) -> bool { self.graph.contains(node) }
  #[inline]
  fn node_count(&self) -> usize { self.graph.node_count() }

  fn describe(&self) -> String { format!("Dot(nodes={})", self.names.len()) }
}

fn parse_statement(line: &str) -> Option<Statement> {
  let line = line.trim();
  if is_ignored(line) {
    return Some(Statement::Ignored);
  }
  let mut statement = line.strip_suffix(';').unwrap_or(line).trim_end();
  if let Some((before, attributes)) = statement.split_once('[') {
    if !attributes.trim_end().ends_with(']') {
      return None;
    }
    statement = before.trim_end();
  }
  match statement.split_once("->") {
    Some((from, to)) => Some(Statement::Edge(parse_name(from)?, parse_name(to)?)),
    None => Some(Statement::Node(parse_name(statement)?)),
  }
}

fn is_ignored(line: &str) -> bool {
  line.is_empty()
    || line == "}"
    || line.starts_with("//")
    || line.starts_with("rankdir=")
    || line.starts_with("node ")
    || line.starts_with("edge ")
    || (line.starts_with("digraph ") && line.ends_with('{'))
}

fn parse_name(name: &str) -> Option<&str> {
  let name = name.trim();
  let name = name.strip_prefix('"').and_then(|n| n.strip_suffix('"')).unwrap_or(name);
  if name.is_empty() || name.contains(char::is_whitespace) || name.contains(['"', ';']) || name.contains("->") {
    None
  } else {
    Some(name)
  }
}

/// Writes `dag` in the notation accepted by [`DotDag::parse`]. All nodes are declared first, in ascending order, so
/// that parsing the output yields a graph with the same nodes and edges.
pub fn write_dot<D: Dag + ?Sized>(dag: &D, writer: &mut impl io::Write) -> io::Result<()> {
  writeln!(writer, "digraph dag {{")?;
  let nodes = dag.all_nodes();
  for node in &nodes {
    writeln!(writer, "  {};", node)?;
  }
  for node in nodes {
    for edge_node in dag.edges_from(node) {
      writeln!(writer, "  {} -> {};", node, edge_node)?;
    }
  }
  writeln!(writer, "}}")
}


#[cfg(test)]
mod test {
  use assert_matches::assert_matches;

  use crate::{same_graph, UniformFanOut};

  use super::*;

  fn nodes<const N: usize>(ids: [u64; N]) -> BTreeSet<Node> {
    ids.into_iter().map(Node).collect()
  }

  #[test]
  fn test_first_seen_numbering_and_edge_direction() {
    let dag = DotDag::parse("app -> lib;\nlib -> src;\ntests -> lib;\n").unwrap();
    assert_eq!(dag.name(Node(1)), Some("app"));
    assert_eq!(dag.name(Node(2)), Some("lib"));
    assert_eq!(dag.name(Node(3)), Some("src"));
    assert_eq!(dag.name(Node(4)), Some("tests"));
    assert_eq!(dag.name(Node(5)), None);
    assert_eq!(dag.name(Node(0)), None);
    // `app -> lib` means app depends on lib.
    assert_eq!(dag.edges_from(Node(1)), nodes([2]));
    assert_eq!(dag.edges_from(Node(4)), nodes([2]));
    assert_eq!(dag.root_nodes(), nodes([1, 4]));
    assert_eq!(dag.leaf_nodes(), nodes([3]));
  }

  #[test]
  fn test_isolated_nodes() {
    let dag = DotDag::parse("a;\nb;\na -> c;\n").unwrap();
    assert_eq!(dag.all_nodes(), nodes([1, 2, 3]));
    assert_eq!(dag.root_nodes(), nodes([1, 2]));
    assert_eq!(dag.leaf_nodes(), nodes([2, 3]));
  }

  #[test]
  fn test_graphviz_boilerplate_is_ignored() {
    let text = r#"digraph ninja {
rankdir="LR"
node [fontsize=10, shape=box, height=0.25]
edge [fontsize=10]
"0x1" [label="out"]
"0x2" [label="cp", shape=ellipse]
"0x2" -> "0x1"
"0x3" -> "0x2" [arrowhead=none]
"0x3" [label="in"]
}
"#;
    let dag = DotDag::parse(text).unwrap();
    assert_eq!(dag.node_count(), 3);
    assert_eq!(dag.name(Node(1)), Some("0x1"));
    // Arrows point from inputs to outputs here, so the input is the root and the output the leaf.
    assert_eq!(dag.edges_from(Node(2)), nodes([1]));
    assert_eq!(dag.edges_from(Node(3)), nodes([2]));
    assert_eq!(dag.root_nodes(), nodes([3]));
    assert_eq!(dag.leaf_nodes(), nodes([1]));
  }

  #[test]
  fn test_blank_lines_and_comments() {
    let dag = DotDag::parse("\n// a comment\n  a -> b;  \n\n").unwrap();
    assert_eq!(dag.node_count(), 2);
  }

  #[test]
  fn test_malformed_line() {
    let result = DotDag::parse("a -> b;\nthis is not a statement\n");
    assert_matches!(result, Err(ParseError::MalformedLine { line_number: 2, line }) => {
      assert_eq!(line, "this is not a statement");
    });
  }

  #[test]
  fn test_malformed_edges() {
    assert_matches!(DotDag::parse("a ->;"), Err(ParseError::MalformedLine { line_number: 1, .. }));
    assert_matches!(DotDag::parse("a -> b -> c;"), Err(ParseError::MalformedLine { line_number: 1, .. }));
    assert_matches!(DotDag::parse("a->b->c;"), Err(ParseError::MalformedLine { line_number: 1, .. }));
    assert_matches!(DotDag::parse("\"a->b\";"), Err(ParseError::MalformedLine { line_number: 1, .. }));
    assert_matches!(DotDag::parse("a -> b [label=x"), Err(ParseError::MalformedLine { line_number: 1, .. }));
    assert_matches!(DotDag::parse("\"\";"), Err(ParseError::MalformedLine { line_number: 1, .. }));
  }

  #[test]
  fn test_cycle() {
    let result = DotDag::parse("a -> b;\nb -> c;\nc -> b;\n");
    assert_matches!(result, Err(ParseError::Cycle { name }) if name == "b" || name == "c");
  }

  #[test]
  fn test_parse_error_display() {
    let error = ParseError::MalformedLine { line_number: 3, line: "x y".to_string() };
    assert_eq!(error.to_string(), "parse error on line 3: x y");
  }

  #[test]
  fn test_write_then_parse() -> Result<(), io::Error> {
    let dag = UniformFanOut::new(3, 3);
    let mut buffer = Vec::new();
    write_dot(&dag, &mut buffer)?;
    let text = String::from_utf8(buffer).expect("DOT output is not UTF-8");
    assert!(text.starts_with("digraph dag {\n  1;\n"));
    assert!(text.contains("  1 -> 2;\n"));
    let parsed = DotDag::parse(&text).unwrap();
    assert!(same_graph(&dag, &parsed));
    Ok(())
  }
}
