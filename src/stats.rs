//! Per-edge sample statistics and binned chi-square goodness of fit.
//!
//! Each edge's observations are summarised by their mean and sample
//! standard deviation, then tested against two candidate models by
//! sorting the observations into four bins and comparing observed with
//! expected counts.
//!
//! # Binning
//!
//! | Model | Thresholds | Expected proportions |
//! |---|---|---|
//! | Normal | μ−Ω, μ, μ+Ω | 0.16, 0.34, 0.34, 0.16 |
//! | Uniform | a, μ, μ+b | 0.01, 0.49, 0.49, 0.01 |
//!
//! with `a = μ − √3·Ω` and `b = μ + √3·a`.
//!
//! Bins form an ordered partition: an observation lands in the first bin
//! whose upper threshold it does not exceed, so every observation is
//! counted exactly once even when the uniform thresholds are not
//! increasing.
//!
//! # Algorithms
//! - **Mean**: Neumaier compensated summation.
//! - **Spread**: Welford's online algorithm with Bessel's correction.
//!   Reference: Welford (1962), *Technometrics* 4(3), pp. 419–420.

use crate::edge::{EdgeId, EdgeSample};
use crate::error::{Error, Result};
use crate::selection::DistributionKind;

/// Expected bin proportions under the normal model.
pub const NORMAL_PROPORTIONS: [f64; 4] = [0.16, 0.34, 0.34, 0.16];

/// Expected bin proportions under the uniform model.
pub const UNIFORM_PROPORTIONS: [f64; 4] = [0.01, 0.49, 0.49, 0.01];

/// Neumaier compensated summation.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
pub fn compensated_sum(data: &[f64]) -> f64 {
    let (sum, compensation) = data.iter().fold((0.0_f64, 0.0_f64), |(sum, c), &x| {
        let t = sum + x;
        let c = if sum.abs() >= x.abs() {
            c + ((sum - t) + x)
        } else {
            c + ((x - t) + sum)
        };
        (t, c)
    });
    sum + compensation
}

/// Running mean and sum of squared deviations (Welford).
#[derive(Debug, Clone, Default)]
struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn sample_std_dev(&self) -> Option<f64> {
        (self.count >= 2).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}

/// Sample standard deviation with Bessel's correction.
///
/// # Returns
/// - `None` if `data.len() < 2` or any value is not finite.
///
/// # Examples
/// ```
/// use netcenter::stats::sample_std_dev;
/// let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((sd - 2.138089935299395).abs() < 1e-10);
/// ```
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    if !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mut moments = Moments::default();
    data.iter().for_each(|&x| moments.update(x));
    moments.sample_std_dev()
}

/// Uniform bounds derived from the sample moments.
///
/// `a = mean − √3·spread`, `b = mean + √3·a`. The upper bound is defined
/// from `a`, not from the spread.
pub fn uniform_bounds(mean: f64, spread: f64) -> (f64, f64) {
    let sqrt3 = 3.0_f64.sqrt();
    let a = mean - sqrt3 * spread;
    let b = mean + sqrt3 * a;
    (a, b)
}

/// Counts observations per bin for three cut points.
///
/// Bin `i < 3` holds values `≤ thresholds[i]` not claimed by an earlier bin;
/// bin 3 holds the rest.
pub fn bin_counts(data: &[f64], thresholds: [f64; 3]) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for &x in data {
        let bin = thresholds.iter().position(|&t| x <= t).unwrap_or(3);
        counts[bin] += 1;
    }
    counts
}

/// Pearson chi-square statistic Σ (O−E)²/E.
///
/// # Errors
/// Returns the index of the bin at fault: the first bin whose expected count
/// is not strictly positive, else the first bin whose term is not finite,
/// else, when only the sum overflows, the bin with the largest term.
///
/// # Examples
/// ```
/// use netcenter::stats::chi_square;
/// assert_eq!(chi_square(&[2, 2, 2, 2], &[2.0; 4]), Ok(0.0));
/// assert_eq!(chi_square(&[2, 2, 2, 2], &[4.0, 0.0, 2.0, 2.0]), Err(1));
/// ```
pub fn chi_square(observed: &[usize; 4], expected: &[f64; 4]) -> std::result::Result<f64, usize> {
    if let Some(bin) = expected.iter().position(|&e| !(e > 0.0)) {
        return Err(bin);
    }
    let terms: [f64; 4] = std::array::from_fn(|i| {
        let d = observed[i] as f64 - expected[i];
        d * d / expected[i]
    });
    if let Some(bin) = terms.iter().position(|t| !t.is_finite()) {
        return Err(bin);
    }
    let sum: f64 = terms.iter().sum();
    if !sum.is_finite() {
        let bin = terms
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i);
        return Err(bin);
    }
    Ok(sum)
}

/// Binned goodness-of-fit result for one candidate model.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodnessOfFit {
    pub kind: DistributionKind,
    /// Cut points separating the four bins.
    pub thresholds: [f64; 3],
    pub observed: [usize; 4],
    pub expected: [f64; 4],
    pub chi_square: f64,
}

impl GoodnessOfFit {
    fn evaluate(
        edge: &EdgeId,
        kind: DistributionKind,
        data: &[f64],
        thresholds: [f64; 3],
        proportions: [f64; 4],
    ) -> Result<Self> {
        let n = data.len() as f64;
        let observed = bin_counts(data, thresholds);
        let expected = proportions.map(|p| p * n);
        let chi_square = chi_square(&observed, &expected).map_err(|bin| Error::DegenerateBin {
            edge: edge.to_string(),
            kind,
            bin,
        })?;
        Ok(Self {
            kind,
            thresholds,
            observed,
            expected,
            chi_square,
        })
    }
}

/// Summary statistics and both model tests for one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStatistics {
    edge: EdgeId,
    count: usize,
    mean: f64,
    spread: f64,
    normal: Result<GoodnessOfFit>,
    uniform: Result<GoodnessOfFit>,
}

impl SampleStatistics {
    /// Computes moments and both goodness-of-fit tests for `sample`.
    ///
    /// # Errors
    /// [`Error::InsufficientData`] if there are fewer than two observations
    /// or they have zero variance. A [`Error::DegenerateBin`] only
    /// disqualifies the affected model and is stored, not returned.
    pub fn compute(sample: &EdgeSample) -> Result<Self> {
        let edge = sample.id().clone();
        let data: Vec<f64> = sample.observations().iter().map(|&x| f64::from(x)).collect();
        let count = data.len();

        let insufficient = |reason: String| Error::InsufficientData {
            edge: edge.to_string(),
            reason,
        };
        if count < 2 {
            return Err(insufficient(format!(
                "{count} observation(s), at least 2 required"
            )));
        }
        let mean = compensated_sum(&data) / count as f64;
        let spread = sample_std_dev(&data)
            .ok_or_else(|| insufficient("non-finite observations".to_owned()))?;
        if spread == 0.0 {
            return Err(insufficient("observations have zero variance".to_owned()));
        }

        let normal = GoodnessOfFit::evaluate(
            &edge,
            DistributionKind::Normal,
            &data,
            [mean - spread, mean, mean + spread],
            NORMAL_PROPORTIONS,
        );
        let (a, b) = uniform_bounds(mean, spread);
        let uniform = GoodnessOfFit::evaluate(
            &edge,
            DistributionKind::Uniform,
            &data,
            [a, mean, mean + b],
            UNIFORM_PROPORTIONS,
        );

        Ok(Self {
            edge,
            count,
            mean,
            spread,
            normal,
            uniform,
        })
    }

    /// Edge the observations belong to.
    pub fn edge(&self) -> &EdgeId {
        &self.edge
    }

    /// Number of observations `n`.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean `E`, computed with compensated summation.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation Ω.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Uniform bounds `(a, b)` for these moments.
    pub fn uniform_bounds(&self) -> (f64, f64) {
        uniform_bounds(self.mean, self.spread)
    }

    /// Normal-model test, or the reason it was disqualified.
    pub fn normal(&self) -> &Result<GoodnessOfFit> {
        &self.normal
    }

    /// Uniform-model test, or the reason it was disqualified.
    pub fn uniform(&self) -> &Result<GoodnessOfFit> {
        &self.uniform
    }
}

#[cfg(test)]
impl SampleStatistics {
    /// Replaces both model results, keeping the moments.
    pub(crate) fn with_models(
        mut self,
        normal: Result<GoodnessOfFit>,
        uniform: Result<GoodnessOfFit>,
    ) -> Self {
        self.normal = normal;
        self.uniform = uniform;
        self
    }
}
