use std::fmt;
use std::time::Duration;

/// Result of measuring one configuration: building one DAG with one builder under one scenario.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Run {
  builder: String,
  dag: String,
  dag_set: String,
  variable_label: String,
  variable: u64,
  scenario: String,
  measurement: Duration,
}

impl Run {
  pub fn new(
    builder: impl Into<String>,
    dag: impl Into<String>,
    dag_set: impl Into<String>,
    variable_label: impl Into<String>,
    variable: u64,
    scenario: impl Into<String>,
    measurement: Duration,
  ) -> Self {
    Self {
      builder: builder.into(),
      dag: dag.into(),
      dag_set: dag_set.into(),
      variable_label: variable_label.into(),
      variable,
      scenario: scenario.into(),
      measurement,
    }
  }

  #[inline]
  pub fn builder(&self) -> &str { &self.builder }
  #[inline]
  pub fn dag(&self) -> &str { &self.dag }
  #[inline]
  pub fn dag_set(&self) -> &str { &self.dag_set }
  /// What the variable measures in the DAG set, for example `Dependency Depth`.
  #[inline]
  pub fn variable_label(&self) -> &str { &self.variable_label }
  #[inline]
  pub fn variable(&self) -> u64 { self.variable }
  #[inline]
  pub fn scenario(&self) -> &str { &self.scenario }
  /// Duration of the fastest measured build.
  #[inline]
  pub fn measurement(&self) -> Duration { self.measurement }
}

impl fmt::Display for Run {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} | {} | {} | {}: {} | {} | {:.6}s",
      self.builder,
      self.dag_set,
      self.dag,
      self.variable_label,
      self.variable,
      self.scenario,
      self.measurement.as_secs_f64()
    )
  }
}
