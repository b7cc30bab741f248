use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use bss_graph::{Dag, DotDag, LinearChain, node_count_for_fan_out, UniformFanOut};

use crate::error::{ConfigError, Error};
use crate::tracker::Tracker;

/// Family of DAGs that vary in one dimension, the variable of the family.
pub trait DagSet {
  /// Name of the family, as shown in run records.
  fn name(&self) -> &'static str;

  /// What the variable of the family measures, for example `Dependency Depth`.
  fn variable_label(&self) -> &'static str;

  /// Creates the DAGs of this family, each with its variable.
  fn dags(&self, tracker: &mut dyn Tracker) -> Result<Vec<(u64, Box<dyn Dag>)>, Error>;
}

fn check_parameters(kind: DagSetKind, values: &[u64], valid: impl Fn(u64) -> bool) -> Result<(), ConfigError> {
  if values.is_empty() {
    return Err(ConfigError::NoDagParameters(kind));
  }
  match values.iter().find(|v| !valid(**v)) {
    Some(value) => Err(ConfigError::InvalidDagParameter { dag_set: kind, value: *value }),
    None => Ok(()),
  }
}


/// Linear chains, with their depth as variable.
#[derive(Clone, Debug)]
pub struct LinearDagSet {
  depths: Vec<u64>,
}

impl LinearDagSet {
  pub fn new(depths: Vec<u64>) -> Result<Self, ConfigError> {
    check_parameters(DagSetKind::Linear, &depths, |d| d >= 1)?;
    Ok(Self { depths })
  }
}

impl DagSet for LinearDagSet {
  #[inline]
  fn name(&self) -> &'static str { "Linear" }
  #[inline]
  fn variable_label(&self) -> &'static str { "Dependency Depth" }

  fn dags(&self, _tracker: &mut dyn Tracker) -> Result<Vec<(u64, Box<dyn Dag>)>, Error> {
    Ok(self.depths.iter().map(|d| (*d, Box::new(LinearChain::new(*d)) as Box<dyn Dag>)).collect())
  }
}


/// Uniform fan-out trees of depth 2: a single root depending on `fan_out` leaves. The fan-out is the variable.
#[derive(Clone, Debug)]
pub struct FanOutDagSet {
  fan_outs: Vec<u64>,
}

impl FanOutDagSet {
  pub const DEPTH: u64 = 2;

  pub fn new(fan_outs: Vec<u64>) -> Result<Self, ConfigError> {
    check_parameters(DagSetKind::FanOut, &fan_outs, |f| {
      f >= 1 && UniformFanOut::checked_node_count(Self::DEPTH, f).is_some()
    })?;
    Ok(Self { fan_outs })
  }
}

impl DagSet for FanOutDagSet {
  #[inline]
  fn name(&self) -> &'static str { "Uniform Fan-Out" }
  #[inline]
  fn variable_label(&self) -> &'static str { "Fan-Out (Edges)" }

  fn dags(&self, _tracker: &mut dyn Tracker) -> Result<Vec<(u64, Box<dyn Dag>)>, Error> {
    Ok(self.fan_outs.iter().map(|f| (*f, Box::new(UniformFanOut::new(Self::DEPTH, *f)) as Box<dyn Dag>)).collect())
  }
}


/// Uniform fan-out trees whose depth equals their fan-out, selected by node count. The actual node count is the
/// variable; when no tree has exactly the requested count, a smaller tree is used and a warning is tracked.
#[derive(Clone, Debug)]
pub struct SquareFanOutDagSet {
  node_counts: Vec<u64>,
}

impl SquareFanOutDagSet {
  pub fn new(node_counts: Vec<u64>) -> Result<Self, ConfigError> {
    check_parameters(DagSetKind::SquareFanOut, &node_counts, |n| n >= 1)?;
    Ok(Self { node_counts })
  }
}

impl DagSet for SquareFanOutDagSet {
  #[inline]
  fn name(&self) -> &'static str { "Square Fan-Out" }
  #[inline]
  fn variable_label(&self) -> &'static str { "Node Count" }

  fn dags(&self, tracker: &mut dyn Tracker) -> Result<Vec<(u64, Box<dyn Dag>)>, Error> {
    let mut dags = Vec::with_capacity(self.node_counts.len());
    for node_count in &self.node_counts {
      let size = node_count_for_fan_out(*node_count)?;
      if !size.is_exact() {
        tracker.fan_out_substituted(&size);
      }
      dags.push((size.node_count, Box::new(size.create_dag()) as Box<dyn Dag>));
    }
    Ok(dags)
  }
}


/// DAGs parsed from DOT files, with their node count as variable.
#[derive(Clone, Debug)]
pub struct DotDagSet {
  paths: Vec<PathBuf>,
}

impl DotDagSet {
  pub fn new(paths: Vec<PathBuf>) -> Result<Self, ConfigError> {
    if paths.is_empty() {
      return Err(ConfigError::NoDagParameters(DagSetKind::Dot));
    }
    Ok(Self { paths })
  }
}

impl DagSet for DotDagSet {
  #[inline]
  fn name(&self) -> &'static str { "DOT" }
  #[inline]
  fn variable_label(&self) -> &'static str { "Node Count" }

  fn dags(&self, _tracker: &mut dyn Tracker) -> Result<Vec<(u64, Box<dyn Dag>)>, Error> {
    let mut dags = Vec::with_capacity(self.paths.len());
    for path in &self.paths {
      let text = fs::read_to_string(path)?;
      let dag = DotDag::parse(&text).map_err(|error| Error::Parse { path: path.clone(), error })?;
      dags.push((dag.node_count() as u64, Box::new(dag) as Box<dyn Dag>));
    }
    Ok(dags)
  }
}


/// Short names of the DAG sets.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(rename_all = "kebab-case"))]
pub enum DagSetKind {
  Linear,
  FanOut,
  SquareFanOut,
  Dot,
}

impl DagSetKind {
  pub const ALL: [DagSetKind; 4] = [DagSetKind::Linear, DagSetKind::FanOut, DagSetKind::SquareFanOut, DagSetKind::Dot];

  #[inline]
  pub fn short_name(&self) -> &'static str {
    match self {
      DagSetKind::Linear => "linear",
      DagSetKind::FanOut => "fan-out",
      DagSetKind::SquareFanOut => "square-fan-out",
      DagSetKind::Dot => "dot",
    }
  }
}

impl FromStr for DagSetKind {
  type Err = ConfigError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter()
      .find(|k| k.short_name() == s)
      .ok_or_else(|| ConfigError::UnknownName { kind: "DAG set", name: s.to_string() })
  }
}

impl fmt::Display for DagSetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.short_name())
  }
}

/// Parameters of all DAG sets.
#[derive(Clone, Default, Debug)]
pub struct DagSetParameters {
  pub linear_depths: Vec<u64>,
  pub fan_out_edges: Vec<u64>,
  pub node_counts: Vec<u64>,
  pub dot_files: Vec<PathBuf>,
}

impl DagSetParameters {
  /// Returns the kinds of DAG sets that have parameters.
  pub fn kinds_with_parameters(&self) -> Vec<DagSetKind> {
    DagSetKind::ALL.into_iter().filter(|k| !self.is_empty_for(*k)).collect()
  }

  fn is_empty_for(&self, kind: DagSetKind) -> bool {
    match kind {
      DagSetKind::Linear => self.linear_depths.is_empty(),
      DagSetKind::FanOut => self.fan_out_edges.is_empty(),
      DagSetKind::SquareFanOut => self.node_counts.is_empty(),
      DagSetKind::Dot => self.dot_files.is_empty(),
    }
  }

  /// Creates the DAG set of `kind` from its parameters.
  pub fn create(&self, kind: DagSetKind) -> Result<Box<dyn DagSet>, ConfigError> {
    let dag_set: Box<dyn DagSet> = match kind {
      DagSetKind::Linear => Box::new(LinearDagSet::new(self.linear_depths.clone())?),
      DagSetKind::FanOut => Box::new(FanOutDagSet::new(self.fan_out_edges.clone())?),
      DagSetKind::SquareFanOut => Box::new(SquareFanOutDagSet::new(self.node_counts.clone())?),
      DagSetKind::Dot => Box::new(DotDagSet::new(self.dot_files.clone())?),
    };
    Ok(dag_set)
  }
}


#[cfg(test)]
mod test {
  use std::fs::write;

  use assert_matches::assert_matches;
  use testresult::TestResult;

  use bss_graph::{same_graph, validate};
  use dev_shared::create_temp_dir;

  use crate::tracker::EventTracker;

  use super::*;

  fn variables(dags: &[(u64, Box<dyn Dag>)]) -> Vec<u64> {
    dags.iter().map(|(v, _)| *v).collect()
  }

  #[test]
  fn test_linear() -> TestResult {
    let dag_set = LinearDagSet::new(vec![1, 10, 100])?;
    let dags = dag_set.dags(&mut ())?;
    assert_eq!(variables(&dags), vec![1, 10, 100]);
    assert!(same_graph(dags[1].1.as_ref(), &LinearChain::new(10)));
    assert_eq!(dag_set.variable_label(), "Dependency Depth");
    Ok(())
  }

  #[test]
  fn test_fan_out() -> TestResult {
    let dags = FanOutDagSet::new(vec![1, 5])?.dags(&mut ())?;
    assert_eq!(variables(&dags), vec![1, 5]);
    assert_eq!(dags[1].1.node_count(), 6);
    assert_eq!(dags[1].1.leaf_nodes().len(), 5);
    Ok(())
  }

  #[test]
  fn test_square_fan_out_warns_on_substitution() -> TestResult {
    let mut tracker = EventTracker::default();
    let dags = SquareFanOutDagSet::new(vec![13, 100])?.dags(&mut tracker)?;
    assert_eq!(variables(&dags), vec![13, 85]);
    let substitutions = tracker.fan_out_substitutions();
    assert_eq!(substitutions.len(), 1);
    assert_eq!(substitutions[0].requested_node_count, 100);
    assert_eq!(substitutions[0].node_count, 85);
    Ok(())
  }

  #[test]
  fn test_dot() -> TestResult {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("graph.dot");
    write(&path, "digraph g {\n  a -> b;\n  a -> c;\n}\n")?;
    let dags = DotDagSet::new(vec![path])?.dags(&mut ())?;
    assert_eq!(variables(&dags), vec![3]);
    validate(dags[0].1.as_ref());
    Ok(())
  }

  #[test]
  fn test_dot_parse_error_names_file() -> TestResult {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("broken.dot");
    write(&path, "a -> b\n-> c\n")?;
    let result = DotDagSet::new(vec![path.clone()])?.dags(&mut ());
    assert_matches!(result.err(), Some(Error::Parse { path: p, .. }) if p == path);
    Ok(())
  }

  #[test]
  fn test_invalid_parameters() {
    assert_matches!(LinearDagSet::new(vec![]), Err(ConfigError::NoDagParameters(DagSetKind::Linear)));
    assert_matches!(LinearDagSet::new(vec![3, 0]), Err(ConfigError::InvalidDagParameter { value: 0, .. }));
    assert_matches!(
      FanOutDagSet::new(vec![0]),
      Err(ConfigError::InvalidDagParameter { dag_set: DagSetKind::FanOut, .. })
    );
    assert_matches!(SquareFanOutDagSet::new(vec![0]), Err(ConfigError::InvalidDagParameter { .. }));
    assert_matches!(DotDagSet::new(vec![]), Err(ConfigError::NoDagParameters(DagSetKind::Dot)));
  }

  #[test]
  fn test_parameters() {
    let parameters = DagSetParameters { linear_depths: vec![1], node_counts: vec![13], ..DagSetParameters::default() };
    assert_eq!(parameters.kinds_with_parameters(), vec![DagSetKind::Linear, DagSetKind::SquareFanOut]);
    assert!(parameters.create(DagSetKind::Linear).is_ok());
    assert_eq!(parameters.create(DagSetKind::FanOut).err(), Some(ConfigError::NoDagParameters(DagSetKind::FanOut)));
    assert_eq!("square-fan-out".parse::<DagSetKind>(), Ok(DagSetKind::SquareFanOut));
  }
}
