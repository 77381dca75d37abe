//! # netcenter
//!
//! Monte Carlo estimation of facility-center stability on small transport
//! graphs whose edge travel times are only known through repeated samples.
//!
//! Each edge's samples are tested against a normal and a uniform model; the
//! better fit drives random weight synthesis. Every trial builds a random
//! network, runs all-pairs shortest paths and records which vertex minimizes
//! the sum of its incoming and outgoing eccentricities. The tally over many
//! trials tells how stable that choice of center is.
//!
//! ## Modules
//!
//! - [`stats`]: moments, binning and chi-square statistics per edge
//! - [`selection`]: distribution choice and the fit table
//! - [`network`]: random network synthesis
//! - [`shortest_path`]: Dijkstra and distance matrices
//! - [`center`]: eccentricities and the center of one trial
//! - [`simulation`]: sharded Monte Carlo runs and the center tally
//! - [`report`]: serializable presentation tables
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Welford's algorithm for variance,
//!   compensated summation for means
//! - **Reproducible**: a seed and a shard count fix every draw of a run
//! - **Property-based testing**: graph and statistical invariants verified
//!   via proptest
//!
//! ## Example
//! ```
//! use netcenter::config::SimulationConfig;
//! use netcenter::edge::EdgeSample;
//! use netcenter::selection::FitTable;
//! use netcenter::simulation::MonteCarlo;
//!
//! let samples = vec![
//!     EdgeSample::new("A:B", vec![10, 12, 11, 13, 9, 10, 14, 11, 12, 10])?,
//!     EdgeSample::new("B:C", vec![20, 20, 12, 23, 22, 32, 21, 19, 26, 21, 25, 18])?,
//! ];
//! let fits = FitTable::fit(&samples)?;
//! let tally = MonteCarlo::from_fits(&fits, SimulationConfig::new(200))?.run()?;
//! assert_eq!(tally.total(), 200);
//! # Ok::<(), netcenter::error::Error>(())
//! ```

pub mod center;
pub mod config;
pub mod edge;
pub mod error;
pub mod network;
pub mod random;
pub mod report;
pub mod selection;
pub mod shortest_path;
pub mod simulation;
pub mod special;
pub mod stats;

pub use error::{Error, Result};
