use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::path::Path;

use bss::builder::{Direct, file_names};
use bss::{Builder, Error};
use bss_graph::{Dag, Node};

use crate::fs::{create_temp_file, write_until_modified};

/// [`Builder`] that builds in-process through [`Direct`], and records which nodes every build rebuilt. Can be scripted
/// to fail, and waits for an observed modification time change instead of sleeping.
#[derive(Default, Debug)]
pub struct InProcessBuilder {
  builds: RefCell<Vec<Vec<Node>>>,
  set_up_count: Cell<usize>,
  fail_on_build: Option<usize>,
}

impl InProcessBuilder {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Creates a builder where build number `build` (0-based, counting all builds) fails.
  #[inline]
  pub fn failing_on_build(build: usize) -> Self { Self { fail_on_build: Some(build), ..Self::default() } }

  /// Returns the nodes rebuilt by every build so far, each in rebuild order.
  #[inline]
  pub fn builds(&self) -> Vec<Vec<Node>> { self.builds.borrow().clone() }

  /// Returns the nodes rebuilt by the last build.
  #[inline]
  pub fn last_build(&self) -> Vec<Node> { self.builds.borrow().last().cloned().unwrap_or_default() }

  #[inline]
  pub fn set_up_count(&self) -> usize { self.set_up_count.get() }
}

impl Builder for InProcessBuilder {
  #[inline]
  fn name(&self) -> &'static str { "In-Process" }

  fn set_up(&self, dag: &dyn Dag, work_dir: &Path) -> Result<(), Error> {
    self.set_up_count.set(self.set_up_count.get() + 1);
    Direct.set_up(dag, work_dir)
  }

  fn build(&self, targets: &BTreeSet<Node>, work_dir: &Path) -> Result<(), Error> {
    let build = self.builds.borrow().len();
    self.builds.borrow_mut().push(Vec::new());
    if self.fail_on_build == Some(build) {
      return Err(Error::ToolFailed {
        tool: "in-process",
        command: format!("build {}", file_names(targets)),
        status: Some(1),
        stderr: "scripted failure".to_string(),
      });
    }

    let rebuilt = Direct.update(targets, work_dir)?;
    if let Some(last) = self.builds.borrow_mut().last_mut() {
      *last = rebuilt;
    }
    Ok(())
  }

  fn wait_for_filesystem_stamp_granularity(&self) {
    let marker = create_temp_file();
    write_until_modified(marker.path(), "marker").expect("failed to wait for a file modification time change");
  }

  #[inline]
  fn version(&self) -> Result<String, Error> { Ok("in-process 0.1.0".to_string()) }
}
