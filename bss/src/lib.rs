#![forbid(unsafe_code)]

//! Build system shootout: measures how fast build tools build generated dependency graphs, both from scratch and
//! incrementally.
//!
//! A [`Harness`] measures every combination of [`Builder`] (an adapter for an external build tool such as GNU Make or
//! Ninja), [`Dag`](bss_graph::Dag) (from a [`DagSet`]), and [`Scenario`] (how the workspace is prepared before the
//! timed build) in a [`Configuration`], and produces a [`Run`] record for each.

pub use builder::{Builder, BuilderKind};
pub use config::{Configuration, Selection};
pub use dag_set::{DagSet, DagSetKind, DagSetParameters};
pub use error::{ConfigError, Error};
pub use harness::{Clock, Harness, MonotonicClock};
pub use run::Run;
pub use scenario::{LeafSeeder, Scenario, ScenarioKind, Workspace};

pub mod builder;
pub mod config;
pub mod dag_set;
pub mod error;
pub mod harness;
pub mod run;
pub mod scenario;
pub mod stamp;
pub mod tracker;
