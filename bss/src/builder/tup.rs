use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use bss_graph::{Dag, Node};

use crate::builder::{Builder, build_targets, file_names, ProjectSyntax, Rule, run_tool, tool_version, write_project};
use crate::error::Error;

/// Tup, driven by a `Tupfile` in a freshly initialized Tup database.
///
/// Tup only accepts an input that is generated by another rule if that rule comes first, so rules are emitted
/// dependencies-first. Tup monitors files through FUSE, which must be available for builds to work.
#[derive(Copy, Clone, Default, Debug)]
pub struct Tup;

impl ProjectSyntax for Tup {
  const FILE_NAME: &'static str = "Tupfile";
  const REQUIRES_DEPENDENCIES_FIRST: bool = true;

  fn write_rule(&self, writer: &mut dyn Write, rule: &Rule) -> io::Result<()> {
    writeln!(writer, ": {} |> cat %f > %o |> {}", file_names(&rule.inputs), rule.output)
  }
}

impl Builder for Tup {
  #[inline]
  fn name(&self) -> &'static str { "Tup" }

  fn set_up(&self, dag: &dyn Dag, work_dir: &Path) -> Result<(), Error> {
    write_project(self, dag, work_dir)?;
    run_tool("tup", &["init".to_string()], Some(work_dir))?;
    Ok(())
  }

  fn build(&self, targets: &BTreeSet<Node>, work_dir: &Path) -> Result<(), Error> {
    build_targets("tup", &["upd", "-j1"], targets, work_dir)
  }

  #[inline]
  fn version(&self) -> Result<String, Error> { tool_version("tup") }
}
