use std::io::{self, Stderr, Stdout};
use std::time::Duration;

use bss_graph::{FanOutSize, Node};

use crate::tracker::Tracker;

/// A [`Tracker`] that writes events to a [`std::io::Write`] instance, for example [`std::io::Stderr`].
#[derive(Debug, Clone)]
pub struct WritingTracker<W> {
  writer: W,
  indentation: u32,
}

impl Default for WritingTracker<Stdout> {
  #[inline]
  fn default() -> Self { Self::new_stdout_writer() }
}

impl Default for WritingTracker<Stderr> {
  #[inline]
  fn default() -> Self { Self::new_stderr_writer() }
}

impl<W: io::Write> WritingTracker<W> {
  #[inline]
  pub fn new(writer: W) -> Self { Self { writer, indentation: 0 } }

  #[inline]
  pub fn into_inner(self) -> W { self.writer }
}

impl WritingTracker<Stdout> {
  #[inline]
  pub fn new_stdout_writer() -> Self { Self::new(io::stdout()) }
}

impl WritingTracker<Stderr> {
  #[inline]
  pub fn new_stderr_writer() -> Self { Self::new(io::stderr()) }
}

impl<W: io::Write> Tracker for WritingTracker<W> {
  #[inline]
  fn run_start(&mut self) {
    self.writeln(format_args!("Benchmark start"));
    self.indent();
  }
  #[inline]
  fn run_end(&mut self, run_count: usize) {
    self.unindent();
    self.writeln(format_args!("Benchmark end: {} runs", run_count));
  }

  #[inline]
  fn builder_version(&mut self, builder: &str, version: &str) {
    self.writeln(format_args!("{}: {}", builder, version));
  }
  #[inline]
  fn fan_out_substituted(&mut self, size: &FanOutSize) {
    self.writeln(format_args!(
      "warning: no square fan-out DAG has {} nodes; using {} nodes (depth and fan-out {}) instead",
      size.requested_node_count, size.node_count, size.depth
    ));
  }

  #[inline]
  fn measure_start(&mut self, builder: &str, dag: &str, scenario: &str) {
    self.writeln(format_args!("→ {} | {} | {}", builder, dag, scenario));
    self.indent();
  }
  #[inline]
  fn measure_end(&mut self, _builder: &str, _dag: &str, _scenario: &str, measurement: Duration) {
    self.unindent();
    self.writeln(format_args!("← {:?}", measurement));
  }

  #[inline]
  fn repetition_start(&mut self, repetition: usize, warmup: bool) {
    let kind = if warmup { "warmup" } else { "repetition" };
    self.writeln(format_args!("{} {}", kind, repetition));
    self.indent();
  }
  #[inline]
  fn repetition_end(&mut self, _repetition: usize, _warmup: bool, duration: Duration) {
    self.writeln(format_args!("⏱ {:?}", duration));
    self.unindent();
  }

  #[inline]
  fn scenario_set_up_start(&mut self, scenario: &str) {
    self.writeln(format_args!("set up {}", scenario));
    self.indent();
  }
  #[inline]
  fn scenario_set_up_end(&mut self, _scenario: &str) {
    self.unindent();
  }
  #[inline]
  fn preliminary_build_start(&mut self) {
    self.writeln(format_args!("untimed build"));
  }
  #[inline]
  fn leaves_seeded(&mut self, count: usize, iteration: u64) {
    self.writeln(format_args!("seeded {} leaves (iteration {})", count, iteration));
  }
  #[inline]
  fn dirty_nodes_selected(&mut self, nodes: &[Node]) {
    self.write_indentation();
    self.write(format_args!("dirty:"));
    for node in nodes {
      self.write(format_args!(" {}", node));
    }
    self.write_nl();
  }
}

impl<W: io::Write> WritingTracker<W> {
  #[inline]
  fn write(&mut self, args: std::fmt::Arguments) {
    write!(&mut self.writer, "{}", args).ok();
  }
  #[inline]
  fn writeln(&mut self, args: std::fmt::Arguments) {
    self.write_indentation();
    writeln!(&mut self.writer, "{}", args).ok();
  }
  #[inline]
  fn write_indentation(&mut self) {
    for _ in 0..self.indentation {
      write!(&mut self.writer, "  ").ok();
    }
  }
  #[inline]
  fn write_nl(&mut self) {
    writeln!(&mut self.writer).ok();
  }

  #[inline]
  fn indent(&mut self) {
    self.indentation = self.indentation.saturating_add(1);
  }
  #[inline]
  fn unindent(&mut self) {
    self.indentation = self.indentation.saturating_sub(1);
  }
}
