use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bss_graph::{Dag, Node};

use crate::builder::{Builder, target_nodes};
use crate::config::{Configuration, validate_iterations};
use crate::error::{ConfigError, Error};
use crate::run::Run;
use crate::scenario::{LeafSeeder, Scenario, Workspace};
use crate::tracker::Tracker;

/// Source of monotonic timestamps for measuring builds.
pub trait Clock {
  fn now(&mut self) -> Instant;
}

/// [`Clock`] reading [`Instant::now`].
#[derive(Copy, Clone, Default, Debug)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
  #[inline]
  fn now(&mut self) -> Instant { Instant::now() }
}

/// Measures builds: every repetition gets a fresh temporary workspace that the builder and scenario prepare, after
/// which one build of the root nodes is timed.
pub struct Harness<C = MonotonicClock, T = ()> {
  clock: C,
  tracker: T,
  seeder: LeafSeeder,
  temp_root: Option<PathBuf>,
}

impl Default for Harness {
  #[inline]
  fn default() -> Self { Self::new() }
}

impl Harness {
  /// Creates a harness with a monotonic clock that does not track events.
  #[inline]
  pub fn new() -> Self { Self::with(MonotonicClock, ()) }
}

impl<C: Clock, T: Tracker> Harness<C, T> {
  #[inline]
  pub fn with(clock: C, tracker: T) -> Self {
    Self { clock, tracker, seeder: LeafSeeder::new(), temp_root: None }
  }

  /// Creates temporary workspaces in `temp_root` instead of the system's temporary directory.
  #[inline]
  pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
    self.temp_root = Some(temp_root.into());
    self
  }

  #[inline]
  pub fn tracker(&self) -> &T { &self.tracker }
  #[inline]
  pub fn tracker_mut(&mut self) -> &mut T { &mut self.tracker }
  #[inline]
  pub fn seeder(&self) -> &LeafSeeder { &self.seeder }

  /// Measures building the root nodes of `dag` that are not leaves (see [`target_nodes`]) with `builder` under
  /// `scenario`, `warmup_iterations + iterations` times. The first `warmup_iterations` durations are discarded; returns
  /// the minimum of the rest.
  ///
  /// Fails before creating any workspace when `iterations` is not positive or `warmup_iterations` is negative. Any
  /// builder or scenario failure aborts the measurement.
  pub fn measure(
    &mut self,
    builder: &dyn Builder,
    dag: &dyn Dag,
    scenario: &dyn Scenario,
    iterations: i64,
    warmup_iterations: i64,
  ) -> Result<Duration, Error> {
    let (iterations, warmup_iterations) = validate_iterations(iterations, warmup_iterations)?;
    let build_targets = target_nodes(dag);
    let builder_name = builder.name();
    let dag_description = dag.describe();
    let scenario_name = scenario.display_name();
    self.tracker.measure_start(builder_name, &dag_description, &scenario_name);

    let mut fastest: Option<Duration> = None;
    for repetition in 0..warmup_iterations + iterations {
      let warmup = repetition < warmup_iterations;
      self.tracker.repetition_start(repetition, warmup);
      let duration = self.measure_once(builder, dag, scenario, &scenario_name, &build_targets)?;
      self.tracker.repetition_end(repetition, warmup, duration);
      if !warmup {
        fastest = Some(fastest.map_or(duration, |f| f.min(duration)));
      }
    }
    let Some(measurement) = fastest else {
      return Err(ConfigError::ZeroIterations.into());
    };

    self.tracker.measure_end(builder_name, &dag_description, &scenario_name, measurement);
    Ok(measurement)
  }

  fn measure_once(
    &mut self,
    builder: &dyn Builder,
    dag: &dyn Dag,
    scenario: &dyn Scenario,
    scenario_name: &str,
    build_targets: &BTreeSet<Node>,
  ) -> Result<Duration, Error> {
    // Deleted when dropped, also when returning early on errors.
    let temp_dir = create_workspace_dir(self.temp_root.as_deref())?;
    let dir = temp_dir.path();

    builder.set_up(dag, dir)?;
    self.tracker.scenario_set_up_start(scenario_name);
    let mut workspace = Workspace::new(dir, &mut self.seeder, &mut self.tracker);
    scenario.set_up(dag, builder, build_targets, &mut workspace)?;
    self.tracker.scenario_set_up_end(scenario_name);

    let start = self.clock.now();
    builder.build(build_targets, dir)?;
    let end = self.clock.now();
    Ok(end.saturating_duration_since(start))
  }

  /// Measures every combination of builder, DAG, and scenario of `configuration`, returning a run record for each.
  ///
  /// Runs are ordered by builder, then DAG set, then scenario, then DAG. All DAGs are created, and the version of
  /// every builder is requested, before the first measurement.
  pub fn run(&mut self, configuration: &Configuration) -> Result<Vec<Run>, Error> {
    configuration.validate()?;
    self.tracker.run_start();

    let mut dag_sets = Vec::with_capacity(configuration.dag_sets.len());
    for dag_set in &configuration.dag_sets {
      dag_sets.push((dag_set.as_ref(), dag_set.dags(&mut self.tracker)?));
    }
    for builder in &configuration.builders {
      let version = builder.version()?;
      self.tracker.builder_version(builder.name(), &version);
    }

    let mut runs = Vec::new();
    for builder in &configuration.builders {
      for (dag_set, dags) in &dag_sets {
        for scenario in &configuration.scenarios {
          for (variable, dag) in dags {
            let measurement = self.measure(
              builder.as_ref(),
              dag.as_ref(),
              scenario.as_ref(),
              configuration.iterations,
              configuration.warmup_iterations,
            )?;
            runs.push(Run::new(
              builder.name(),
              dag.describe(),
              dag_set.name(),
              dag_set.variable_label(),
              *variable,
              scenario.display_name(),
              measurement,
            ));
          }
        }
      }
    }

    self.tracker.run_end(runs.len());
    Ok(runs)
  }
}

fn create_workspace_dir(temp_root: Option<&Path>) -> Result<tempfile::TempDir, std::io::Error> {
  let mut builder = tempfile::Builder::new();
  builder.prefix("bss-");
  match temp_root {
    Some(temp_root) => builder.tempdir_in(temp_root),
    None => builder.tempdir(),
  }
}
