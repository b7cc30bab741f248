use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use bss_graph::{Dag, Node};

use crate::builder::{Builder, build_targets, file_names, ProjectSyntax, Rule, tool_version, write_project};
use crate::error::Error;

/// Ninja, driven by a `build.ninja` with a single `cat` rule.
#[derive(Copy, Clone, Default, Debug)]
pub struct Ninja;

impl ProjectSyntax for Ninja {
  const FILE_NAME: &'static str = "build.ninja";
  const REQUIRES_DEPENDENCIES_FIRST: bool = false;

  fn write_header(&self, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(writer, "ninja_required_version = 1.0")?;
    writeln!(writer)?;
    writeln!(writer, "rule cat")?;
    writeln!(writer, "  command = cat $in > $out")?;
    writeln!(writer)
  }

  fn write_rule(&self, writer: &mut dyn Write, rule: &Rule) -> io::Result<()> {
    writeln!(writer, "build {}: cat {}", rule.output, file_names(&rule.inputs))
  }
}

impl Builder for Ninja {
  #[inline]
  fn name(&self) -> &'static str { "Ninja" }

  fn set_up(&self, dag: &dyn Dag, work_dir: &Path) -> Result<(), Error> {
    write_project(self, dag, work_dir)?;
    Ok(())
  }

  fn build(&self, targets: &BTreeSet<Node>, work_dir: &Path) -> Result<(), Error> {
    build_targets("ninja", &["-j1", "-f", Self::FILE_NAME], targets, work_dir)
  }

  #[inline]
  fn version(&self) -> Result<String, Error> { tool_version("ninja") }
}
