use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bss_graph::{AdjacencyDag, Dag, Node, topologically_leveled};

use crate::builder::{Builder, file_names, ProjectSyntax, Rule, write_project};
use crate::error::Error;
use crate::scenario::node_path;
use crate::stamp::modified;

/// Baseline that builds in-process without any build tool, giving a lower bound for the build tools.
///
/// Rules are read from a plain rules file. Outputs are visited dependencies-first, and an output is rebuilt when it is
/// missing, when one of its inputs was rebuilt, or when one of its inputs was modified after it.
#[derive(Copy, Clone, Default, Debug)]
pub struct Direct;

impl ProjectSyntax for Direct {
  const FILE_NAME: &'static str = "direct.rules";
  const REQUIRES_DEPENDENCIES_FIRST: bool = false;

  fn write_rule(&self, writer: &mut dyn Write, rule: &Rule) -> io::Result<()> {
    writeln!(writer, "{}: {}", rule.output, file_names(&rule.inputs))
  }
}

impl Direct {
  /// Brings `targets` in `work_dir` up to date, returning the rebuilt nodes in the order they were rebuilt.
  pub fn update(&self, targets: &BTreeSet<Node>, work_dir: &Path) -> Result<Vec<Node>, Error> {
    let rules = read_rules(work_dir)?;

    let mut reachable = AdjacencyDag::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<Node> = targets.iter().copied().collect();
    while let Some(node) = stack.pop() {
      if !visited.insert(node) { continue; }
      reachable.add_node(node);
      if let Some(inputs) = rules.get(&node) {
        for input in inputs {
          reachable.add_edge(node, *input);
          stack.push(*input);
        }
      }
    }

    let mut levels = topologically_leveled(&reachable).into_iter();
    for source in levels.next().unwrap_or_default() {
      if modified(node_path(work_dir, source))?.is_none() {
        return Err(Error::ToolFailed {
          tool: "direct",
          command: format!("build {}", file_names(targets)),
          status: None,
          stderr: format!("no rule to make {}", source),
        });
      }
    }

    let mut rebuilt = Vec::new();
    let mut rebuilt_set = HashSet::new();
    for node in levels.flatten() {
      let inputs = reachable.edges_from(node);
      let path = node_path(work_dir, node);
      if is_outdated(&path, &inputs, &rebuilt_set, work_dir)? {
        concatenate(&inputs, work_dir, &path)?;
        rebuilt_set.insert(node);
        rebuilt.push(node);
      }
    }
    Ok(rebuilt)
  }
}

impl Builder for Direct {
  #[inline]
  fn name(&self) -> &'static str { "Direct Copy" }

  fn set_up(&self, dag: &dyn Dag, work_dir: &Path) -> Result<(), Error> {
    write_project(self, dag, work_dir)?;
    Ok(())
  }

  fn build(&self, targets: &BTreeSet<Node>, work_dir: &Path) -> Result<(), Error> {
    self.update(targets, work_dir)?;
    Ok(())
  }

  #[inline]
  fn version(&self) -> Result<String, Error> { Ok(format!("bss {}", env!("CARGO_PKG_VERSION"))) }
}

fn read_rules(work_dir: &Path) -> Result<BTreeMap<Node, BTreeSet<Node>>, Error> {
  let text = fs::read_to_string(work_dir.join(Direct::FILE_NAME))?;
  let parse = |s: &str| s.parse::<u64>().map(Node).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
  let mut rules = BTreeMap::new();
  for line in text.lines() {
    let Some((output, inputs)) = line.split_once(':') else { continue; };
    let inputs = inputs.split_whitespace().map(parse).collect::<Result<_, _>>()?;
    rules.insert(parse(output.trim())?, inputs);
  }
  Ok(rules)
}

fn is_outdated(
  output: &Path,
  inputs: &BTreeSet<Node>,
  rebuilt: &HashSet<Node>,
  work_dir: &Path,
) -> Result<bool, io::Error> {
  let Some(output_modified) = modified(output)? else {
    return Ok(true);
  };
  for input in inputs {
    if rebuilt.contains(input) {
      return Ok(true);
    }
    if modified(node_path(work_dir, *input))?.map_or(false, |m| m > output_modified) {
      return Ok(true);
    }
  }
  Ok(false)
}

fn concatenate(inputs: &BTreeSet<Node>, work_dir: &Path, output: &Path) -> Result<(), io::Error> {
  let mut writer = BufWriter::new(File::create(output)?);
  for input in inputs {
    io::copy(&mut File::open(node_path(work_dir, *input))?, &mut writer)?;
  }
  writer.flush()
}
