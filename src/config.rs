//! Configuration for a Monte Carlo run.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::NormalDrawMode;

/// Configuration for a simulation run.
///
/// Missing fields fall back to [`SimulationConfig::default`] when
/// deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent trials.
    pub trials: u64,

    /// Base seed; shard streams are derived from it.
    pub seed: u64,

    /// Number of shards the trials are split into.
    ///
    /// Fixed independently of the thread count so results only depend on
    /// `seed` and `shards`.
    pub shards: usize,

    /// How normal-fitted edges obtain their draw.
    pub normal_draw: NormalDrawMode,
}

impl SimulationConfig {
    /// Trial count of a default run.
    pub const DEFAULT_TRIALS: u64 = 10_001;
    /// Shard count of a default run.
    pub const DEFAULT_SHARDS: usize = 16;

    /// Create a configuration for `trials` trials with default settings.
    pub fn new(trials: u64) -> Self {
        Self {
            trials,
            seed: 12345,
            shards: Self::DEFAULT_SHARDS,
            normal_draw: NormalDrawMode::default(),
        }
    }

    /// Set the number of trials.
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of shards.
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Set the normal draw mode.
    pub fn with_normal_draw(mut self, mode: NormalDrawMode) -> Self {
        self.normal_draw = mode;
        self
    }

    /// Draw independently for every normal-fitted edge.
    pub fn with_per_edge_draws(self) -> Self {
        self.with_normal_draw(NormalDrawMode::PerEdge)
    }

    /// Checks the configuration before a run.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] if `shards` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.shards == 0 {
            return Err(Error::InvalidConfig("shards must be at least 1".into()));
        }
        Ok(())
    }

    /// Trials assigned to `shard`; earlier shards take the remainder.
    pub fn shard_trials(&self, shard: usize) -> u64 {
        let shards = self.shards.max(1) as u64;
        let shard = shard as u64;
        if shard >= shards {
            return 0;
        }
        self.trials / shards + u64::from(shard < self.trials % shards)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TRIALS)
    }
}
