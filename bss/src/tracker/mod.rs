use std::time::Duration;

use bss_graph::{FanOutSize, Node};

pub use event::{Event, EventTracker};
pub use writing::WritingTracker;

pub mod writing;
pub mod event;

/// Benchmark event tracker. Can be used to implement logging, progress reporting, event recording for tests, etc.
///
/// Object-safe trait.
#[allow(unused_variables)]
pub trait Tracker {
  /// Start: run all configurations of a benchmark.
  #[inline]
  fn run_start(&mut self) {}
  /// End: ran all configurations, producing `run_count` run records.
  #[inline]
  fn run_end(&mut self, run_count: usize) {}

  /// `builder` reported its `version`.
  #[inline]
  fn builder_version(&mut self, builder: &str, version: &str) {}
  /// Warning: no square fan-out DAG has the requested node count, so a smaller one was selected.
  #[inline]
  fn fan_out_substituted(&mut self, size: &FanOutSize) {}

  /// Start: measure building `dag` with `builder` under `scenario`.
  #[inline]
  fn measure_start(&mut self, builder: &str, dag: &str, scenario: &str) {}
  /// End: measured building `dag` with `builder` under `scenario`, with `measurement` as the fastest build.
  #[inline]
  fn measure_end(&mut self, builder: &str, dag: &str, scenario: &str, measurement: Duration) {}

  /// Start: repetition `repetition` (0-based, warmups included) of a measurement.
  #[inline]
  fn repetition_start(&mut self, repetition: usize, warmup: bool) {}
  /// End: repetition `repetition` of a measurement took `duration`.
  #[inline]
  fn repetition_end(&mut self, repetition: usize, warmup: bool, duration: Duration) {}

  /// Start: set up the workspace for `scenario`.
  #[inline]
  fn scenario_set_up_start(&mut self, scenario: &str) {}
  /// End: set up the workspace for `scenario`.
  #[inline]
  fn scenario_set_up_end(&mut self, scenario: &str) {}
  /// Start: untimed build that brings the workspace up to date before invalidating it.
  #[inline]
  fn preliminary_build_start(&mut self) {}
  /// End: untimed build.
  #[inline]
  fn preliminary_build_end(&mut self) {}
  /// Wrote the contents of `count` leaf nodes, with `iteration` as the last leaf content counter.
  #[inline]
  fn leaves_seeded(&mut self, count: usize, iteration: u64) {}
  /// Selected `nodes` (in selection order) to be rebuilt, and deleted their outputs.
  #[inline]
  fn dirty_nodes_selected(&mut self, nodes: &[Node]) {}
}

/// Implement [`Tracker`] for `()` that does nothing.
impl Tracker for () {}

/// A [`Tracker`] that forwards events to two [`Tracker`]s.
#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug)]
pub struct CompositeTracker<A1, A2>(pub A1, pub A2);
impl<A1, A2> CompositeTracker<A1, A2> {
  pub fn new(tracker_1: A1, tracker_2: A2) -> Self { Self(tracker_1, tracker_2) }
}
impl<A1: Tracker, A2: Tracker> Tracker for CompositeTracker<A1, A2> {
  #[inline]
  fn run_start(&mut self) {
    self.0.run_start();
    self.1.run_start();
  }
  #[inline]
  fn run_end(&mut self, run_count: usize) {
    self.0.run_end(run_count);
    self.1.run_end(run_count);
  }

  #[inline]
  fn builder_version(&mut self, builder: &str, version: &str) {
    self.0.builder_version(builder, version);
    self.1.builder_version(builder, version);
  }
  #[inline]
  fn fan_out_substituted(&mut self, size: &FanOutSize) {
    self.0.fan_out_substituted(size);
    self.1.fan_out_substituted(size);
  }

  #[inline]
  fn measure_start(&mut self, builder: &str, dag: &str, scenario: &str) {
    self.0.measure_start(builder, dag, scenario);
    self.1.measure_start(builder, dag, scenario);
  }
  #[inline]
  fn measure_end(&mut self, builder: &str, dag: &str, scenario: &str, measurement: Duration) {
    self.0.measure_end(builder, dag, scenario, measurement);
    self.1.measure_end(builder, dag, scenario, measurement);
  }

  #[inline]
  fn repetition_start(&mut self, repetition: usize, warmup: bool) {
    self.0.repetition_start(repetition, warmup);
    self.1.repetition_start(repetition, warmup);
  }
  #[inline]
  fn repetition_end(&mut self, repetition: usize, warmup: bool, duration: Duration) {
    self.0.repetition_end(repetition, warmup, duration);
    self.1.repetition_end(repetition, warmup, duration);
  }

  #[inline]
  fn scenario_set_up_start(&mut self, scenario: &str) {
    self.0.scenario_set_up_start(scenario);
    self.1.scenario_set_up_start(scenario);
  }
  #[inline]
  fn scenario_set_up_end(&mut self, scenario: &str) {
    self.0.scenario_set_up_end(scenario);
    self.1.scenario_set_up_end(scenario);
  }
  #[inline]
  fn preliminary_build_start(&mut self) {
    self.0.preliminary_build_start();
    self.1.preliminary_build_start();
  }
  #[inline]
  fn preliminary_build_end(&mut self) {
    self.0.preliminary_build_end();
    self.1.preliminary_build_end();
  }
  #[inline]
  fn leaves_seeded(&mut self, count: usize, iteration: u64) {
    self.0.leaves_seeded(count, iteration);
    self.1.leaves_seeded(count, iteration);
  }
  #[inline]
  fn dirty_nodes_selected(&mut self, nodes: &[Node]) {
    self.0.dirty_nodes_selected(nodes);
    self.1.dirty_nodes_selected(nodes);
  }
}
