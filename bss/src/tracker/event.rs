use std::time::Duration;

use bss_graph::{FanOutSize, Node};

use crate::tracker::Tracker;

/// A [`Tracker`] that stores [`Event`]s in a [`Vec`], useful in testing to assert which steps a benchmark took.
#[derive(Clone, Debug)]
pub struct EventTracker {
  events: Vec<Event>,
  clear_on_run_start: bool,
}

impl Default for EventTracker {
  fn default() -> Self {
    Self { events: Vec::new(), clear_on_run_start: true }
  }
}

/// Enumeration of benchmark events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
  RunStart,
  RunEnd { run_count: usize },

  BuilderVersion { builder: String, version: String },
  FanOutSubstituted(FanOutSize),

  MeasureStart { builder: String, dag: String, scenario: String },
  MeasureEnd { builder: String, dag: String, scenario: String, measurement: Duration },

  RepetitionStart { repetition: usize, warmup: bool },
  RepetitionEnd { repetition: usize, warmup: bool, duration: Duration },

  ScenarioSetUpStart { scenario: String },
  ScenarioSetUpEnd { scenario: String },
  PreliminaryBuildStart,
  PreliminaryBuildEnd,
  LeavesSeeded { count: usize, iteration: u64 },
  DirtyNodesSelected(Vec<Node>),
}

impl Tracker for EventTracker {
  #[inline]
  fn run_start(&mut self) {
    if self.clear_on_run_start {
      self.events.clear();
    }
    self.events.push(Event::RunStart);
  }
  #[inline]
  fn run_end(&mut self, run_count: usize) {
    self.events.push(Event::RunEnd { run_count });
  }

  #[inline]
  fn builder_version(&mut self, builder: &str, version: &str) {
    self.events.push(Event::BuilderVersion { builder: builder.to_string(), version: version.to_string() });
  }
  #[inline]
  fn fan_out_substituted(&mut self, size: &FanOutSize) {
    self.events.push(Event::FanOutSubstituted(*size));
  }

  #[inline]
  fn measure_start(&mut self, builder: &str, dag: &str, scenario: &str) {
    let (builder, dag, scenario) = (builder.to_string(), dag.to_string(), scenario.to_string());
    self.events.push(Event::MeasureStart { builder, dag, scenario });
  }
  #[inline]
  fn measure_end(&mut self, builder: &str, dag: &str, scenario: &str, measurement: Duration) {
    let (builder, dag, scenario) = (builder.to_string(), dag.to_string(), scenario.to_string());
    self.events.push(Event::MeasureEnd { builder, dag, scenario, measurement });
  }

  #[inline]
  fn repetition_start(&mut self, repetition: usize, warmup: bool) {
    self.events.push(Event::RepetitionStart { repetition, warmup });
  }
  #[inline]
  fn repetition_end(&mut self, repetition: usize, warmup: bool, duration: Duration) {
    self.events.push(Event::RepetitionEnd { repetition, warmup, duration });
  }

  #[inline]
  fn scenario_set_up_start(&mut self, scenario: &str) {
    self.events.push(Event::ScenarioSetUpStart { scenario: scenario.to_string() });
  }
  #[inline]
  fn scenario_set_up_end(&mut self, scenario: &str) {
    self.events.push(Event::ScenarioSetUpEnd { scenario: scenario.to_string() });
  }
  #[inline]
  fn preliminary_build_start(&mut self) {
    self.events.push(Event::PreliminaryBuildStart);
  }
  #[inline]
  fn preliminary_build_end(&mut self) {
    self.events.push(Event::PreliminaryBuildEnd);
  }
  #[inline]
  fn leaves_seeded(&mut self, count: usize, iteration: u64) {
    self.events.push(Event::LeavesSeeded { count, iteration });
  }
  #[inline]
  fn dirty_nodes_selected(&mut self, nodes: &[Node]) {
    self.events.push(Event::DirtyNodesSelected(nodes.to_vec()));
  }
}

impl EventTracker {
  #[inline]
  pub fn new(clear_on_run_start: bool) -> Self { Self { events: Vec::new(), clear_on_run_start } }

  /// Returns a slice over all events.
  #[inline]
  pub fn slice(&self) -> &[Event] { &self.events }
  /// Returns an iterator over all events.
  #[inline]
  pub fn iter(&self) -> impl Iterator<Item=&Event> { self.events.iter() }
  /// Clears all events.
  #[inline]
  pub fn clear(&mut self) { self.events.clear(); }

  /// Returns the nodes of every dirty node selection, in order.
  pub fn dirty_node_selections(&self) -> Vec<&[Node]> {
    self.iter().filter_map(|e| match e {
      Event::DirtyNodesSelected(nodes) => Some(nodes.as_slice()),
      _ => None,
    }).collect()
  }

  /// Returns the durations of all repetitions, with whether each was a warmup.
  pub fn repetition_durations(&self) -> Vec<(bool, Duration)> {
    self.iter().filter_map(|e| match e {
      Event::RepetitionEnd { warmup, duration, .. } => Some((*warmup, *duration)),
      _ => None,
    }).collect()
  }

  /// Returns the number of untimed builds that were started.
  pub fn preliminary_build_count(&self) -> usize {
    self.iter().filter(|e| matches!(e, Event::PreliminaryBuildStart)).count()
  }

  /// Returns the substituted fan-out sizes that were warned about.
  pub fn fan_out_substitutions(&self) -> Vec<FanOutSize> {
    self.iter().filter_map(|e| match e {
      Event::FanOutSubstituted(size) => Some(*size),
      _ => None,
    }).collect()
  }
}
