use crate::builder::{Builder, BuilderKind};
use crate::dag_set::{DagSet, DagSetKind, DagSetParameters};
use crate::error::ConfigError;
use crate::scenario::{Scenario, ScenarioKind};

/// Everything a benchmark runs: every builder is measured on every DAG of every DAG set, under every scenario.
pub struct Configuration {
  pub iterations: i64,
  pub warmup_iterations: i64,
  pub builders: Vec<Box<dyn Builder>>,
  pub dag_sets: Vec<Box<dyn DagSet>>,
  pub scenarios: Vec<Box<dyn Scenario>>,
}

impl Configuration {
  /// Creates a configuration without builders, DAG sets, or scenarios.
  pub fn new(iterations: i64, warmup_iterations: i64) -> Self {
    Self { iterations, warmup_iterations, builders: Vec::new(), dag_sets: Vec::new(), scenarios: Vec::new() }
  }

  pub fn with_builder(mut self, builder: impl Builder + 'static) -> Self {
    self.builders.push(Box::new(builder));
    self
  }
  pub fn with_dag_set(mut self, dag_set: impl DagSet + 'static) -> Self {
    self.dag_sets.push(Box::new(dag_set));
    self
  }
  pub fn with_scenario(mut self, scenario: impl Scenario + 'static) -> Self {
    self.scenarios.push(Box::new(scenario));
    self
  }

  /// Checks that the configuration can be run.
  pub fn validate(&self) -> Result<(), ConfigError> {
    validate_iterations(self.iterations, self.warmup_iterations)?;
    if self.builders.is_empty() {
      return Err(ConfigError::NoBuilders);
    }
    if self.dag_sets.is_empty() {
      return Err(ConfigError::NoDagSets);
    }
    if self.scenarios.is_empty() {
      return Err(ConfigError::NoScenarios);
    }
    Ok(())
  }
}

/// Checks `iterations` and `warmup_iterations`, returning them as counts.
pub fn validate_iterations(iterations: i64, warmup_iterations: i64) -> Result<(usize, usize), ConfigError> {
  if iterations < 0 {
    return Err(ConfigError::NegativeIterations(iterations));
  }
  if warmup_iterations < 0 {
    return Err(ConfigError::NegativeWarmupIterations(warmup_iterations));
  }
  if iterations == 0 {
    return Err(ConfigError::ZeroIterations);
  }
  let iterations = usize::try_from(iterations).map_err(|_| ConfigError::NegativeIterations(iterations))?;
  let warmup_iterations = usize::try_from(warmup_iterations)
    .map_err(|_| ConfigError::NegativeWarmupIterations(warmup_iterations))?;
  Ok((iterations, warmup_iterations))
}


/// Selection of builders, DAG sets, and scenarios by short name, resolved into a [`Configuration`] with
/// [`Selection::resolve`].
#[derive(Clone, Debug)]
pub struct Selection {
  pub iterations: i64,
  pub warmup_iterations: i64,
  pub builders: Vec<BuilderKind>,
  /// DAG sets to run. `None` selects every DAG set that has parameters.
  pub dag_sets: Option<Vec<DagSetKind>>,
  pub scenarios: Vec<ScenarioKind>,
  pub incremental_count: Option<usize>,
  pub parameters: DagSetParameters,
}

impl Default for Selection {
  fn default() -> Self {
    Self {
      iterations: 1,
      warmup_iterations: 0,
      builders: BuilderKind::ALL.to_vec(),
      dag_sets: None,
      scenarios: ScenarioKind::ALL.to_vec(),
      incremental_count: None,
      parameters: DagSetParameters::default(),
    }
  }
}

impl Selection {
  /// Creates the selected builders, DAG sets, and scenarios, and validates the resulting configuration.
  pub fn resolve(&self) -> Result<Configuration, ConfigError> {
    let mut configuration = Configuration::new(self.iterations, self.warmup_iterations);
    configuration.builders = self.builders.iter().map(|k| k.create()).collect();
    let dag_set_kinds = match &self.dag_sets {
      Some(kinds) => kinds.clone(),
      None => self.parameters.kinds_with_parameters(),
    };
    configuration.dag_sets = dag_set_kinds.into_iter()
      .map(|k| self.parameters.create(k))
      .collect::<Result<_, _>>()?;
    configuration.scenarios = self.scenarios.iter()
      .map(|k| k.create(self.incremental_count))
      .collect::<Result<_, _>>()?;
    configuration.validate()?;
    Ok(configuration)
  }
}

/// Parses a comma-separated list of short names, ignoring empty entries.
pub fn parse_names<K: std::str::FromStr<Err=ConfigError>>(names: &str) -> Result<Vec<K>, ConfigError> {
  names.split(',').map(str::trim).filter(|n| !n.is_empty()).map(str::parse::<K>).collect()
}


#[cfg(test)]
mod test {
  use assert_matches::assert_matches;
  use rstest::rstest;

  use crate::builder::Make;
  use crate::dag_set::LinearDagSet;
  use crate::scenario::Clean;

  use super::*;

  #[rstest]
  #[case(-1, 0, ConfigError::NegativeIterations(-1))]
  #[case(1, -3, ConfigError::NegativeWarmupIterations(-3))]
  #[case(0, 0, ConfigError::ZeroIterations)]
  #[case(0, 5, ConfigError::ZeroIterations)]
  fn test_invalid_iterations(#[case] iterations: i64, #[case] warmup: i64, #[case] expected: ConfigError) {
    assert_eq!(validate_iterations(iterations, warmup), Err(expected));
  }

  #[test]
  fn test_valid_iterations() {
    assert_eq!(validate_iterations(5, 2), Ok((5, 2)));
    assert_eq!(validate_iterations(1, 0), Ok((1, 0)));
  }

  #[test]
  fn test_empty_selections() -> Result<(), ConfigError> {
    let configuration = Configuration::new(1, 0);
    assert_eq!(configuration.validate(), Err(ConfigError::NoBuilders));
    let configuration = configuration.with_builder(Make);
    assert_eq!(configuration.validate(), Err(ConfigError::NoDagSets));
    let configuration = configuration.with_dag_set(LinearDagSet::new(vec![2])?);
    assert_eq!(configuration.validate(), Err(ConfigError::NoScenarios));
    let configuration = configuration.with_scenario(Clean);
    assert_eq!(configuration.validate(), Ok(()));
    Ok(())
  }

  #[test]
  fn test_resolve_defaults_to_dag_sets_with_parameters() -> Result<(), ConfigError> {
    let mut selection = Selection::default();
    selection.incremental_count = Some(2);
    selection.parameters.fan_out_edges = vec![1, 2];
    let configuration = selection.resolve()?;
    assert_eq!(configuration.builders.len(), 4);
    let names: Vec<_> = configuration.dag_sets.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["Uniform Fan-Out"]);
    assert_eq!(configuration.scenarios.len(), 4);
    Ok(())
  }

  #[test]
  fn test_resolve_errors() {
    let selection = Selection::default();
    assert_matches!(selection.resolve().err(), Some(ConfigError::MissingIncrementalCount));

    let mut selection = Selection::default();
    selection.scenarios = vec![ScenarioKind::Clean];
    assert_matches!(selection.resolve().err(), Some(ConfigError::NoDagSets));

    selection.dag_sets = Some(vec![DagSetKind::Dot]);
    assert_matches!(selection.resolve().err(), Some(ConfigError::NoDagParameters(DagSetKind::Dot)));

    selection.dag_sets = None;
    selection.parameters.linear_depths = vec![4];
    selection.iterations = -2;
    assert_matches!(selection.resolve().err(), Some(ConfigError::NegativeIterations(-2)));
  }

  #[test]
  fn test_parse_names() {
    assert_eq!(
      parse_names::<BuilderKind>("make, ninja,,tup"),
      Ok(vec![BuilderKind::Make, BuilderKind::Ninja, BuilderKind::Tup])
    );
    assert_eq!(parse_names::<ScenarioKind>(""), Ok(vec![]));
    assert_matches!(
      parse_names::<DagSetKind>("linear,tree"),
      Err(ConfigError::UnknownName { name, .. }) if name == "tree"
    );
  }
}
