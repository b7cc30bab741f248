use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;

use bss_graph::{Dag, Node, topologically_leveled};

use crate::error::{ConfigError, Error};
use crate::stamp::filesystem_stamp_granularity;

pub use direct::Direct;
pub use make::Make;
pub use ninja::Ninja;
pub use tup::Tup;

mod direct;
mod make;
mod ninja;
mod tup;

/// Adapter for an external build tool.
///
/// A builder renders a [`Dag`] into the native project file of its tool, and builds target nodes by running the tool.
/// Every node is a file in the work directory named after the node. An edge `x -> y` means that the build command of
/// `x` reads the output of `y`. Builders hold no state between calls; everything a build needs is in the work
/// directory.
pub trait Builder {
  /// Display name of the build tool, for example `GNU Make`.
  fn name(&self) -> &'static str;

  /// Writes the project file for `dag` into `work_dir`, and performs any other tool-specific initialization.
  fn set_up(&self, dag: &dyn Dag, work_dir: &Path) -> Result<(), Error>;

  /// Runs the build tool in `work_dir` with concurrency 1, bringing exactly `targets` and their transitive
  /// dependencies up to date.
  fn build(&self, targets: &BTreeSet<Node>, work_dir: &Path) -> Result<(), Error>;

  /// Blocks until files written afterwards are guaranteed to get a later modification time than files written
  /// before.
  #[inline]
  fn wait_for_filesystem_stamp_granularity(&self) {
    thread::sleep(filesystem_stamp_granularity());
  }

  /// Returns the version of the build tool, as reported by the tool.
  fn version(&self) -> Result<String, Error>;
}


/// Build rule for a non-leaf node: `output` is built by concatenating `inputs`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Rule {
  pub output: Node,
  pub inputs: BTreeSet<Node>,
}

/// Creates a rule for every non-leaf node of `dag`. When `dependencies_first` is set, the rules of a node's
/// dependencies come before the rule of the node itself; otherwise, rules are in ascending node order.
pub fn rules(dag: &dyn Dag, dependencies_first: bool) -> Vec<Rule> {
  let rule = |output: Node| Rule { output, inputs: dag.edges_from(output) };
  if dependencies_first {
    // Leaves are exactly the nodes of level 0.
    topologically_leveled(dag).into_iter().skip(1).flatten().map(rule).collect()
  } else {
    let leaf_nodes = dag.leaf_nodes();
    dag.all_nodes().into_iter().filter(|n| !leaf_nodes.contains(n)).map(rule).collect()
  }
}

/// Returns the nodes of `dag` to build: its root nodes that have a rule. A root that is also a leaf has nothing to
/// build, and build tools reject it as a target.
pub fn target_nodes(dag: &dyn Dag) -> BTreeSet<Node> {
  let leaf_nodes = dag.leaf_nodes();
  dag.root_nodes().into_iter().filter(|n| !leaf_nodes.contains(n)).collect()
}

/// Native project file syntax of a build tool.
pub trait ProjectSyntax {
  /// Name of the project file, relative to the work directory.
  const FILE_NAME: &'static str;
  /// Whether the rule of a node must come after the rules of its dependencies.
  const REQUIRES_DEPENDENCIES_FIRST: bool;

  #[inline]
  fn write_header(&self, _writer: &mut dyn Write) -> io::Result<()> { Ok(()) }

  fn write_rule(&self, writer: &mut dyn Write, rule: &Rule) -> io::Result<()>;
}

/// Renders the project file for `dag` in `syntax` into `writer`.
pub fn render<S: ProjectSyntax>(syntax: &S, dag: &dyn Dag, writer: &mut dyn Write) -> io::Result<()> {
  syntax.write_header(writer)?;
  for rule in rules(dag, S::REQUIRES_DEPENDENCIES_FIRST) {
    syntax.write_rule(writer, &rule)?;
  }
  Ok(())
}

/// Renders the project file for `dag` in `syntax` into `work_dir`, returning the path to the file.
pub fn write_project<S: ProjectSyntax>(syntax: &S, dag: &dyn Dag, work_dir: &Path) -> Result<PathBuf, io::Error> {
  let path = work_dir.join(S::FILE_NAME);
  let mut writer = BufWriter::new(File::create(&path)?);
  render(syntax, dag, &mut writer)?;
  writer.flush()?;
  Ok(path)
}

/// Returns `nodes` as space-separated file names.
pub fn file_names(nodes: &BTreeSet<Node>) -> String {
  nodes.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ")
}


/// Runs `tool` with `args`, in `work_dir` if given, returning its standard output.
///
/// Fails with [`Error::ToolMissing`] if the tool could not be started, and with [`Error::ToolFailed`] if it exits
/// unsuccessfully.
pub fn run_tool(tool: &'static str, args: &[String], work_dir: Option<&Path>) -> Result<String, Error> {
  let mut cmd = duct::cmd(tool, args)
    .unchecked()
    .stdout_capture()
    .stderr_capture();
  if let Some(work_dir) = work_dir {
    cmd = cmd.dir(work_dir);
  }
  let output = cmd.run().map_err(|error| match error.kind() {
    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Error::ToolMissing { tool, error },
    _ => Error::Io(error),
  })?;
  if !output.status.success() {
    let mut command = vec![tool.to_string()];
    command.extend(args.iter().cloned());
    return Err(Error::ToolFailed {
      tool,
      command: command.join(" "),
      status: output.status.code(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    });
  }
  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs `tool --version` and returns the first non-empty line of its output.
pub fn tool_version(tool: &'static str) -> Result<String, Error> {
  let output = run_tool(tool, &["--version".to_string()], None)?;
  let version = output.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
  Ok(version.to_string())
}

/// Builds `targets` by running `tool` with `args` followed by the target file names. Does not run the tool when there
/// are no targets, as tools then build their default targets instead.
fn build_targets(tool: &'static str, args: &[&str], targets: &BTreeSet<Node>, work_dir: &Path) -> Result<(), Error> {
  if targets.is_empty() {
    return Ok(());
  }
  let mut args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
  args.extend(targets.iter().map(|n| n.to_string()));
  run_tool(tool, &args, Some(work_dir))?;
  Ok(())
}


/// Short names of the supported builders.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(rename_all = "kebab-case"))]
pub enum BuilderKind {
  Direct,
  Make,
  Ninja,
  Tup,
}

impl BuilderKind {
  pub const ALL: [BuilderKind; 4] = [BuilderKind::Direct, BuilderKind::Make, BuilderKind::Ninja, BuilderKind::Tup];

  #[inline]
  pub fn short_name(&self) -> &'static str {
    match self {
      BuilderKind::Direct => "direct",
      BuilderKind::Make => "make",
      BuilderKind::Ninja => "ninja",
      BuilderKind::Tup => "tup",
    }
  }

  pub fn create(&self) -> Box<dyn Builder> {
    match self {
      BuilderKind::Direct => Box::new(Direct),
      BuilderKind::Make => Box::new(Make),
      BuilderKind::Ninja => Box::new(Ninja),
      BuilderKind::Tup => Box::new(Tup),
    }
  }
}

impl FromStr for BuilderKind {
  type Err = ConfigError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter()
      .find(|k| k.short_name() == s)
      .ok_or_else(|| ConfigError::UnknownName { kind: "builder", name: s.to_string() })
  }
}

impl fmt::Display for BuilderKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.short_name())
  }
}


#[cfg(test)]
mod test {
  use assert_matches::assert_matches;

  use bss_graph::{AdjacencyDag, LinearChain, UniformFanOut};

  use super::*;

  fn outputs(rules: &[Rule]) -> Vec<u64> {
    rules.iter().map(|r| r.output.0).collect()
  }

  #[test]
  fn test_rules_skip_leaves() {
    let rules = rules(&UniformFanOut::new(3, 2), false);
    assert_eq!(outputs(&rules), vec![1, 2, 3]);
    assert_eq!(rules[0].inputs, BTreeSet::from([Node(2), Node(3)]));
    assert!(rules.iter().all(|r| !r.inputs.is_empty()));
  }

  #[test]
  fn test_rules_dependencies_first() {
    assert_eq!(outputs(&rules(&LinearChain::new(4), true)), vec![3, 2, 1]);
    assert_eq!(outputs(&rules(&UniformFanOut::new(3, 2), true)), vec![2, 3, 1]);
    // Node 1 depends on 4, which depends on 2.
    let dag = AdjacencyDag::from_edges([(1, 4), (4, 2), (2, 3)]);
    let order = outputs(&rules(&dag, true));
    assert_eq!(order, vec![2, 4, 1]);
    assert_eq!(outputs(&rules(&dag, false)), vec![1, 2, 4]);
  }

  #[test]
  fn test_file_names() {
    assert_eq!(file_names(&BTreeSet::from([Node(10), Node(2)])), "2 10");
    assert_eq!(file_names(&BTreeSet::new()), "");
  }

  #[test]
  fn test_builder_kind_from_str() {
    assert_eq!("make".parse::<BuilderKind>(), Ok(BuilderKind::Make));
    assert_eq!("tup".parse::<BuilderKind>(), Ok(BuilderKind::Tup));
    assert_eq!("direct".parse::<BuilderKind>(), Ok(BuilderKind::Direct));
    assert_matches!(
      "scons".parse::<BuilderKind>(),
      Err(ConfigError::UnknownName { kind: "builder", name }) if name == "scons"
    );
    for kind in BuilderKind::ALL {
      assert_eq!(kind.to_string().parse::<BuilderKind>(), Ok(kind));
    }
  }

  #[test]
  fn test_target_nodes_exclude_leaf_roots() {
    assert_eq!(target_nodes(&LinearChain::new(3)), BTreeSet::from([Node(1)]));
    assert!(target_nodes(&LinearChain::new(1)).is_empty());
    // Node 4 is isolated: both a root and a leaf.
    let mut dag = AdjacencyDag::from_edges([(1, 2), (3, 2)]);
    dag.add_node(Node(4));
    assert_eq!(target_nodes(&dag), BTreeSet::from([Node(1), Node(3)]));
  }

  #[test]
  fn test_no_targets_does_not_run_tool() -> Result<(), Error> {
    let temp_dir = dev_shared::create_temp_dir();
    build_targets("bss-tool-that-does-not-exist", &["-j1"], &BTreeSet::new(), temp_dir.path())?;
    let result = build_targets("bss-tool-that-does-not-exist", &["-j1"], &BTreeSet::from([Node(1)]), temp_dir.path());
    assert_matches!(result, Err(Error::ToolMissing { .. }));
    Ok(())
  }

  #[test]
  fn test_missing_tool() {
    let result = run_tool("bss-tool-that-does-not-exist", &[], None);
    assert_matches!(result, Err(Error::ToolMissing { tool: "bss-tool-that-does-not-exist", .. }));
  }
}
