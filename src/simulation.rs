//! Monte Carlo estimation of center stability.
//!
//! A run splits its trials over a fixed number of shards. Each shard owns a
//! generator derived from the run seed and a partial [`CenterTally`]; shards
//! execute on the rayon pool and their tallies are summed once all of them
//! finish. Since the shard count is part of the configuration, the outcome
//! depends on `(seed, shards)` only, not on the number of worker threads.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::center::CenterReport;
use crate::config::SimulationConfig;
use crate::edge::VertexSet;
use crate::error::{Error, Result};
use crate::network::{Network, NetworkDraws, NetworkSynthesizer};
use crate::random::{create_rng, stream_rng};
use crate::selection::FitTable;
use crate::shortest_path::DistanceMatrix;

/// Per-vertex count of trials in which the vertex was the center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenterTally {
    counts: Vec<u64>,
    /// Trials in which no vertex was eligible.
    unresolved: u64,
}

impl CenterTally {
    /// Empty tally over `order` vertices.
    pub fn new(order: usize) -> Self {
        Self {
            counts: vec![0; order],
            unresolved: 0,
        }
    }

    /// Records the outcome of one trial.
    ///
    /// A center outside the tally's vertex range counts as unresolved.
    pub(crate) fn record(&mut self, center: Option<usize>) {
        match center.and_then(|v| self.counts.get_mut(v)) {
            Some(count) => *count += 1,
            None => self.unresolved += 1,
        }
    }

    /// Sums two partial tallies.
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] if the tallies cover different vertex
    /// counts.
    pub fn merge(mut self, other: CenterTally) -> Result<Self> {
        if self.counts.len() != other.counts.len() {
            return Err(Error::DimensionMismatch {
                expected: self.counts.len(),
                actual: other.counts.len(),
            });
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.unresolved += other.unresolved;
        Ok(self)
    }

    /// Center counts indexed by vertex.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Center count of `vertex`; zero if out of range.
    pub fn count(&self, vertex: usize) -> u64 {
        self.counts.get(vertex).copied().unwrap_or(0)
    }

    /// Trials in which no vertex was eligible.
    pub fn unresolved(&self) -> u64 {
        self.unresolved
    }

    /// Trials with a center.
    pub fn resolved(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// All recorded trials.
    pub fn total(&self) -> u64 {
        self.resolved() + self.unresolved
    }

    /// Share of all recorded trials won by `vertex`; zero for an empty tally.
    pub fn frequency(&self, vertex: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(vertex) as f64 / total as f64,
        }
    }

    /// Vertex most often chosen, lowest index on ties.
    pub fn most_frequent(&self) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (v, &c) in self.counts.iter().enumerate() {
            if c > 0 && best.map_or(true, |(_, b)| c > b) {
                best = Some((v, c));
            }
        }
        best.map(|(v, _)| v)
    }
}

/// Everything produced by one seeded trial.
#[derive(Debug, Clone, PartialEq)]
pub struct IllustrativeRun {
    pub draws: NetworkDraws,
    pub network: Network,
    pub distances: DistanceMatrix,
    pub report: CenterReport,
}

/// Drives synthesis, shortest paths and center analysis over many trials.
#[derive(Debug, Clone)]
pub struct MonteCarlo {
    vertices: VertexSet,
    synthesizer: NetworkSynthesizer,
    config: SimulationConfig,
}

impl MonteCarlo {
    /// Prepares a run over an explicit vertex set.
    ///
    /// Vertices not touched by any fitted edge are kept; they are isolated
    /// in every network.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`], or any error from
    /// [`NetworkSynthesizer::new`].
    pub fn new(vertices: VertexSet, fits: &FitTable, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let synthesizer = NetworkSynthesizer::new(&vertices, fits, config.normal_draw)?;
        Ok(Self {
            vertices,
            synthesizer,
            config,
        })
    }

    /// Prepares a run over the vertices spanned by `fits`.
    pub fn from_fits(fits: &FitTable, config: SimulationConfig) -> Result<Self> {
        Self::new(fits.vertices(), fits, config)
    }

    /// Vertex set every trial is indexed by.
    pub fn vertices(&self) -> &VertexSet {
        &self.vertices
    }

    /// Validated run configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Synthesizer shared by every trial.
    pub fn synthesizer(&self) -> &NetworkSynthesizer {
        &self.synthesizer
    }

    /// Runs every configured trial.
    pub fn run(&self) -> Result<CenterTally> {
        self.run_with_cancel(&AtomicBool::new(false))
    }

    /// Runs the configured trials, stopping early once `cancel` is set.
    ///
    /// Cancellation is checked between trials; every completed trial is
    /// counted.
    ///
    /// # Errors
    /// The first error raised by any trial aborts the run.
    pub fn run_with_cancel(&self, cancel: &AtomicBool) -> Result<CenterTally> {
        let order = self.vertices.len();
        info!(
            trials = self.config.trials,
            shards = self.config.shards,
            seed = self.config.seed,
            vertices = order,
            edges = self.synthesizer.edge_count(),
            "starting Monte Carlo run"
        );

        let tally = (0..self.config.shards)
            .into_par_iter()
            .map(|shard| self.run_shard(shard, cancel))
            .try_reduce(|| CenterTally::new(order), CenterTally::merge)?;

        if tally.total() < self.config.trials {
            warn!(
                completed = tally.total(),
                requested = self.config.trials,
                "Monte Carlo run cancelled"
            );
        }
        if tally.unresolved() > 0 {
            warn!(
                unresolved = tally.unresolved(),
                "trials ended without a center; the network was disconnected"
            );
        }
        info!(
            resolved = tally.resolved(),
            unresolved = tally.unresolved(),
            "Monte Carlo run finished"
        );
        Ok(tally)
    }

    fn run_shard(&self, shard: usize, cancel: &AtomicBool) -> Result<CenterTally> {
        let mut rng = stream_rng(self.config.seed, shard as u64);
        let mut tally = CenterTally::new(self.vertices.len());
        for _ in 0..self.config.shard_trials(shard) {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            tally.record(self.trial(&mut rng)?);
        }
        Ok(tally)
    }

    fn trial<R: Rng>(&self, rng: &mut R) -> Result<Option<usize>> {
        let draws = self.synthesizer.draw(rng);
        let network = self.synthesizer.synthesize(&draws)?;
        Ok(CenterReport::analyze(&DistanceMatrix::all_pairs(&network)).center())
    }

    /// Runs a single trial from `seed`, keeping every intermediate result.
    pub fn illustrate(&self, seed: u64) -> Result<IllustrativeRun> {
        let draws = self.synthesizer.draw(&mut create_rng(seed));
        let network = self.synthesizer.synthesize(&draws)?;
        let distances = DistanceMatrix::all_pairs(&network);
        let report = CenterReport::analyze(&distances);
        Ok(IllustrativeRun {
            draws,
            network,
            distances,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeSample;
    use crate::shortest_path::Distance;

    /// A path `A-B-C`; B is the center of every realization.
    fn path_fits() -> FitTable {
        FitTable::fit(&[
            EdgeSample::new("A:B", vec![10, 12, 11, 13, 9, 10, 14, 11, 12, 10]).unwrap(),
            EdgeSample::new("C:B", vec![20, 20, 12, 23, 22, 32, 21, 19, 26, 21, 25, 18]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_tally_merge_and_frequency() {
        let mut a = CenterTally::new(3);
        a.record(Some(1));
        a.record(Some(1));
        a.record(None);
        let mut b = CenterTally::new(3);
        b.record(Some(0));
        let merged = a.merge(b).unwrap();
        assert_eq!(merged.counts(), &[1, 2, 0]);
        assert_eq!(merged.unresolved(), 1);
        assert_eq!(merged.total(), 4);
        assert_eq!(merged.resolved(), 3);
        assert!((merged.frequency(1) - 0.5).abs() < 1e-12);
        assert_eq!(merged.most_frequent(), Some(1));
        assert_eq!(merged.count(9), 0);
    }

    #[test]
    fn test_tally_merge_dimension_mismatch() {
        let err = CenterTally::new(2).merge(CenterTally::new(3)).unwrap_err();
        assert_eq!(err, Error::DimensionMismatch { expected: 2, actual: 3 });
    }

    #[test]
    fn test_record_out_of_range_is_unresolved() {
        let mut tally = CenterTally::new(2);
        tally.record(Some(5));
        tally.record(Some(1));
        assert_eq!(tally.counts(), &[0, 1]);
        assert_eq!(tally.unresolved(), 1);
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn test_empty_tally() {
        let tally = CenterTally::new(2);
        assert_eq!(tally.frequency(0), 0.0);
        assert_eq!(tally.most_frequent(), None);
    }

    #[test]
    fn test_run_counts_every_trial() {
        let config = SimulationConfig::new(1000).with_seed(3).with_shards(7);
        let tally = MonteCarlo::from_fits(&path_fits(), config).unwrap().run().unwrap();
        assert_eq!(tally.total(), 1000);
        assert_eq!(tally.counts(), &[0, 1000, 0]);
    }

    #[test]
    fn test_run_is_reproducible() {
        let fits = FitTable::fit(&[
            EdgeSample::new("A:B", vec![10, 12, 11, 13, 9, 10, 14, 11, 12, 10]).unwrap(),
            EdgeSample::new("B:C", vec![20, 20, 12, 23, 22, 32, 21, 19, 26, 21, 25, 18]).unwrap(),
            EdgeSample::new("A:C", vec![25, 28, 30, 27, 26, 31, 29, 24]).unwrap(),
        ])
        .unwrap();
        let config = SimulationConfig::new(400).with_seed(99).with_shards(5);
        let mc = MonteCarlo::from_fits(&fits, config).unwrap();
        let first = mc.run().unwrap();
        let second = mc.run().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total(), 400);
    }

    #[test]
    fn test_extra_vertex_leaves_trials_unresolved() {
        let vertices = VertexSet::new(["A", "B", "C", "D"]);
        let config = SimulationConfig::new(50).with_shards(4);
        let tally = MonteCarlo::new(vertices, &path_fits(), config).unwrap().run().unwrap();
        assert_eq!(tally.unresolved(), 50);
        assert_eq!(tally.resolved(), 0);
    }

    #[test]
    fn test_cancelled_run_counts_nothing() {
        let mc = MonteCarlo::from_fits(&path_fits(), SimulationConfig::new(100)).unwrap();
        let tally = mc.run_with_cancel(&AtomicBool::new(true)).unwrap();
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.counts().len(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig::default().with_shards(0);
        assert!(matches!(
            MonteCarlo::from_fits(&path_fits(), config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_vertex_rejected() {
        let vertices = VertexSet::new(["A", "B"]);
        let err = MonteCarlo::new(vertices, &path_fits(), SimulationConfig::default()).unwrap_err();
        assert_eq!(err, Error::UnknownVertex("C".into()));
    }

    #[test]
    fn test_illustrative_run() {
        let mc = MonteCarlo::from_fits(&path_fits(), SimulationConfig::default()).unwrap();
        let run = mc.illustrate(11).unwrap();
        assert_eq!(run, mc.illustrate(11).unwrap());

        let ab = run.network.weight(0, 1).unwrap();
        let bc = run.network.weight(1, 2).unwrap();
        assert_eq!(run.network.weight(0, 2), None);
        match run.distances.get(0, 2) {
            Distance::Finite(d) => assert!((d - (ab + bc)).abs() < 1e-9),
            Distance::Unreachable => panic!("path graph is connected"),
        }
        assert_eq!(run.report.center(), Some(1));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn merge_is_commutative(
            a in proptest::collection::vec(0_u64..1000, 4),
            b in proptest::collection::vec(0_u64..1000, 4),
            ua in 0_u64..100,
            ub in 0_u64..100,
        ) {
            let left = CenterTally { counts: a.clone(), unresolved: ua };
            let right = CenterTally { counts: b.clone(), unresolved: ub };
            let ab = left.clone().merge(right.clone()).unwrap();
            let ba = right.merge(left).unwrap();
            prop_assert_eq!(&ab, &ba);
            prop_assert_eq!(ab.total(), a.iter().sum::<u64>() + b.iter().sum::<u64>() + ua + ub);
        }
    }
}
