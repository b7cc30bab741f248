#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use bss::{Harness, MonotonicClock, Run, Selection};
use bss::config::parse_names;
use bss::tracker::{Tracker, WritingTracker};
use bss_graph::FanOutSize;

/// Benchmark build tools on generated dependency graphs, from scratch and incrementally.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
  /// Number of measured repetitions per configuration; the fastest is reported
  #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
  iterations: i64,
  /// Number of repetitions per configuration that are run first and discarded
  #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
  warmup_iterations: i64,
  /// Comma-separated builders to run: direct, make, ninja, tup. Defaults to all
  #[arg(long)]
  builders: Option<String>,
  /// Comma-separated DAG sets to run: linear, fan-out, square-fan-out, dot. Defaults to all that have parameters
  #[arg(long)]
  dags: Option<String>,
  /// Comma-separated scenarios to run: clean, noop, fixed, full. Defaults to all
  #[arg(long)]
  scenarios: Option<String>,
  /// Number of nodes to rebuild in the fixed incremental scenario
  #[arg(long)]
  incremental_count: Option<usize>,
  /// Depths of the linear DAGs
  #[arg(long, value_delimiter = ',')]
  linear_depths: Vec<u64>,
  /// Fan-outs of the depth-2 uniform fan-out DAGs
  #[arg(long, value_delimiter = ',')]
  fan_out_edges: Vec<u64>,
  /// Node counts of the square fan-out DAGs
  #[arg(long, value_delimiter = ',')]
  node_counts: Vec<u64>,
  /// DOT files to parse into DAGs
  #[arg(long, value_delimiter = ',')]
  dot_files: Vec<PathBuf>,
  /// Write a detailed log of every measurement to stderr
  #[arg(short, long)]
  verbose: bool,
  /// Write the run records as JSON to this file
  #[arg(long)]
  json: Option<PathBuf>,
}

impl Cli {
  fn selection(&self) -> Result<Selection> {
    let mut selection = Selection {
      iterations: self.iterations,
      warmup_iterations: self.warmup_iterations,
      incremental_count: self.incremental_count,
      ..Selection::default()
    };
    if let Some(builders) = &self.builders {
      selection.builders = parse_names(builders).context("invalid --builders")?;
    }
    if let Some(dags) = &self.dags {
      selection.dag_sets = Some(parse_names(dags).context("invalid --dags")?);
    }
    if let Some(scenarios) = &self.scenarios {
      selection.scenarios = parse_names(scenarios).context("invalid --scenarios")?;
    }
    selection.parameters.linear_depths = self.linear_depths.clone();
    selection.parameters.fan_out_edges = self.fan_out_edges.clone();
    selection.parameters.node_counts = self.node_counts.clone();
    selection.parameters.dot_files = self.dot_files.clone();
    Ok(selection)
  }
}

/// Writes only builder versions and warnings to stderr.
#[derive(Default, Debug)]
struct SummaryTracker;

impl Tracker for SummaryTracker {
  fn builder_version(&mut self, builder: &str, version: &str) {
    eprintln!("{}: {}", builder, version);
  }
  fn fan_out_substituted(&mut self, size: &FanOutSize) {
    eprintln!(
      "warning: no square fan-out DAG has {} nodes; using {} nodes (depth and fan-out {}) instead",
      size.requested_node_count, size.node_count, size.depth
    );
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  let configuration = cli.selection()?.resolve().context("invalid configuration")?;

  let runs = if cli.verbose {
    Harness::with(MonotonicClock, WritingTracker::new_stderr_writer()).run(&configuration)
  } else {
    Harness::with(MonotonicClock, SummaryTracker).run(&configuration)
  }.context("benchmark failed")?;

  print_runs(&runs)?;
  if let Some(path) = &cli.json {
    write_json(&runs, path).with_context(|| format!("failed to write run records to {}", path.display()))?;
  }
  Ok(())
}

fn print_runs(runs: &[Run]) -> Result<()> {
  let mut stdout = std::io::stdout().lock();
  for run in runs {
    writeln!(stdout, "{}", run)?;
  }
  Ok(())
}

fn write_json(runs: &[Run], path: &Path) -> Result<()> {
  let mut writer = BufWriter::new(File::create(path)?);
  serde_json::to_writer_pretty(&mut writer, runs)?;
  writer.flush()?;
  Ok(())
}


#[cfg(test)]
mod test {
  use bss::{Builder, BuilderKind, DagSetKind, ScenarioKind};

  use super::*;

  #[test]
  fn test_selection_from_arguments() -> Result<()> {
    let cli = Cli::try_parse_from([
      "bss", "--iterations", "3", "--builders", "make,ninja", "--scenarios", "clean,fixed",
      "--incremental-count", "2", "--linear-depths", "1,10", "--node-counts", "13",
    ])?;
    let selection = cli.selection()?;
    assert_eq!(selection.iterations, 3);
    assert_eq!(selection.warmup_iterations, 0);
    assert_eq!(selection.builders, vec![BuilderKind::Make, BuilderKind::Ninja]);
    assert_eq!(selection.scenarios, vec![ScenarioKind::Clean, ScenarioKind::Fixed]);
    assert_eq!(selection.dag_sets, None);
    assert_eq!(selection.parameters.linear_depths, vec![1, 10]);
    assert_eq!(selection.parameters.kinds_with_parameters(), vec![DagSetKind::Linear, DagSetKind::SquareFanOut]);

    let configuration = selection.resolve()?;
    assert_eq!(configuration.builders.len(), 2);
    assert_eq!(configuration.dag_sets.len(), 2);
    assert_eq!(configuration.scenarios.len(), 2);
    Ok(())
  }

  #[test]
  fn test_negative_iterations_are_rejected_on_resolve() -> Result<()> {
    let cli = Cli::try_parse_from(["bss", "--iterations", "-1", "--linear-depths", "1"])?;
    assert!(cli.selection()?.resolve().is_err());
    Ok(())
  }

  #[test]
  fn test_unknown_builder() -> Result<()> {
    let cli = Cli::try_parse_from(["bss", "--builders", "bazel"])?;
    assert!(cli.selection().is_err());
    Ok(())
  }

  #[test]
  fn test_direct_builder() -> Result<()> {
    let cli = Cli::try_parse_from(["bss", "--builders", "direct", "--linear-depths", "1"])?;
    let selection = cli.selection()?;
    assert_eq!(selection.builders, vec![BuilderKind::Direct]);
    assert_eq!(selection.resolve()?.builders[0].name(), "Direct Copy");
    Ok(())
  }
}
