//! Tests against installed build tools and the direct baseline. Tests for a tool that is not installed are skipped.

use std::collections::BTreeSet;
use std::fs::read_to_string;

use rstest::rstest;
use tempfile::TempDir;
use testresult::TestResult;

use bss::{BuilderKind, Harness, LeafSeeder, Scenario, Workspace};
use bss::scenario::{Clean, FixedCountIncremental, NoOpIncremental};
use bss::stamp::modified;
use bss::tracker::EventTracker;
use bss_graph::{Dag, DotDag, LinearChain, Node, UniformFanOut};
use dev_shared::test::{temp_dir, tool_available, tracker};

#[rstest]
#[case(BuilderKind::Direct)]
#[case(BuilderKind::Make)]
#[case(BuilderKind::Ninja)]
fn test_clean_build_concatenates_leaves(
  #[case] kind: BuilderKind,
  temp_dir: TempDir,
  mut tracker: EventTracker,
) -> TestResult {
  let builder = kind.create();
  if !tool_available(builder.as_ref()) { return Ok(()); }

  let dag = LinearChain::new(5);
  let targets = dag.root_nodes();
  let mut seeder = LeafSeeder::new();
  builder.set_up(&dag, temp_dir.path())?;
  Clean.set_up(&dag, builder.as_ref(), &targets, &mut Workspace::new(temp_dir.path(), &mut seeder, &mut tracker))?;
  builder.build(&targets, temp_dir.path())?;
  assert_eq!(read_to_string(temp_dir.path().join("1"))?, LeafSeeder::content(1, Node(5)));
  Ok(())
}

#[rstest]
#[case(BuilderKind::Direct)]
#[case(BuilderKind::Make)]
#[case(BuilderKind::Ninja)]
fn test_fixed_incremental_rebuilds_dirty_nodes(
  #[case] kind: BuilderKind,
  temp_dir: TempDir,
  mut tracker: EventTracker,
) -> TestResult {
  let builder = kind.create();
  if !tool_available(builder.as_ref()) { return Ok(()); }

  let dag = UniformFanOut::new(3, 3);
  let targets = dag.root_nodes();
  let mut seeder = LeafSeeder::new();
  builder.set_up(&dag, temp_dir.path())?;
  let mut workspace = Workspace::new(temp_dir.path(), &mut seeder, &mut tracker);
  FixedCountIncremental::new(2).set_up(&dag, builder.as_ref(), &targets, &mut workspace)?;
  let dirty: BTreeSet<_> = tracker.dirty_node_selections()[0].iter().copied().collect();
  assert_eq!(dirty, BTreeSet::from([Node(1), Node(2)]));

  let clean_modified = modified(temp_dir.path().join("3"))?;
  builder.build(&targets, temp_dir.path())?;
  for node in &dirty {
    assert!(temp_dir.path().join(node.to_string()).exists());
  }
  assert_eq!(modified(temp_dir.path().join("3"))?, clean_modified);
  Ok(())
}

#[rstest]
#[case(BuilderKind::Direct)]
#[case(BuilderKind::Make)]
#[case(BuilderKind::Ninja)]
fn test_measure(#[case] kind: BuilderKind, temp_dir: TempDir) -> TestResult {
  let builder = kind.create();
  if !tool_available(builder.as_ref()) { return Ok(()); }

  let mut harness = Harness::new().with_temp_root(temp_dir.path());
  harness.measure(builder.as_ref(), &UniformFanOut::new(2, 4), &NoOpIncremental, 2, 1)?;
  assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
  // Nothing to build: the only root is also a leaf.
  harness.measure(builder.as_ref(), &LinearChain::new(1), &Clean, 1, 0)?;
  harness.measure(builder.as_ref(), &DotDag::parse("a;\nb -> c;\n")?, &FixedCountIncremental::new(1), 1, 0)?;
  Ok(())
}

// Tup requires FUSE, which is rarely usable in test environments.
#[rstest]
#[ignore]
fn test_tup_clean_build(temp_dir: TempDir, mut tracker: EventTracker) -> TestResult {
  let builder = BuilderKind::Tup.create();
  if !tool_available(builder.as_ref()) { return Ok(()); }

  let dag = UniformFanOut::new(2, 3);
  let targets = dag.root_nodes();
  let mut seeder = LeafSeeder::new();
  builder.set_up(&dag, temp_dir.path())?;
  Clean.set_up(&dag, builder.as_ref(), &targets, &mut Workspace::new(temp_dir.path(), &mut seeder, &mut tracker))?;
  builder.build(&targets, temp_dir.path())?;
  let expected: String = (2..=4).map(|n| LeafSeeder::content(n - 1, Node(n))).collect();
  assert_eq!(read_to_string(temp_dir.path().join("1"))?, expected);
  Ok(())
}
