use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use bss_graph::{Dag, Node};

use crate::builder::{Builder, build_targets, file_names, ProjectSyntax, Rule, tool_version, write_project};
use crate::error::Error;

/// GNU Make, driven by a `GNUmakefile` with built-in rules disabled.
#[derive(Copy, Clone, Default, Debug)]
pub struct Make;

impl ProjectSyntax for Make {
  const FILE_NAME: &'static str = "GNUmakefile";
  const REQUIRES_DEPENDENCIES_FIRST: bool = false;

  fn write_header(&self, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(writer, "MAKEFLAGS += --no-builtin-rules")?;
    writeln!(writer, ".SUFFIXES:")?;
    writeln!(writer)
  }

  fn write_rule(&self, writer: &mut dyn Write, rule: &Rule) -> io::Result<()> {
    writeln!(writer, "{}: {}", rule.output, file_names(&rule.inputs))?;
    writeln!(writer, "\t@cat $^ > $@")
  }
}

impl Builder for Make {
  #[inline]
  fn name(&self) -> &'static str { "GNU Make" }

  fn set_up(&self, dag: &dyn Dag, work_dir: &Path) -> Result<(), Error> {
    write_project(self, dag, work_dir)?;
    Ok(())
  }

  fn build(&self, targets: &BTreeSet<Node>, work_dir: &Path) -> Result<(), Error> {
    build_targets("make", &["-j1", "-f", Self::FILE_NAME], targets, work_dir)
  }

  #[inline]
  fn version(&self) -> Result<String, Error> { tool_version("make") }
}
