//! Seeded random streams for the Monte Carlo trials.
//!
//! Every shard of a simulation run owns its own generator. Shard seeds are
//! derived from the run seed with a SplitMix64 finalizer so that adjacent
//! shard indices map to statistically unrelated `SmallRng` states.
//!
//! # Reproducibility
//! For a fixed run seed and shard count the full set of draws is fixed,
//! independent of how shards are scheduled onto worker threads.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Creates a fast, seeded random number generator.
///
/// # Examples
/// ```
/// use netcenter::random::{create_rng, unit_draw};
/// let mut rng = create_rng(42);
/// let z = unit_draw(&mut rng);
/// assert!((0.0..1.0).contains(&z));
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Derives the seed of stream `stream` from a base seed.
///
/// SplitMix64 finalizer (Steele, Lea & Flood 2014) applied to
/// `base + (stream + 1)·φ`, where φ is the 64-bit golden-ratio increment.
pub fn stream_seed(base: u64, stream: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut z = base.wrapping_add(stream.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Creates the generator for stream `stream` of a run seeded with `base`.
pub fn stream_rng(base: u64, stream: u64) -> SmallRng {
    create_rng(stream_seed(base, stream))
}

/// Draws a uniform value in `[0, 1)`.
pub fn unit_draw<R: Rng>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}
