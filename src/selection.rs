//! Distribution selection per edge.
//!
//! Each goodness-of-fit statistic is converted to its right-tail probability
//! under χ²(1). The model with the larger probability (the one the data
//! rejects less strongly) is kept; the normal model wins ties. A model whose
//! test was disqualified loses by default.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::edge::{EdgeId, EdgeSample, VertexSet};
use crate::error::{Error, Result};
use crate::special;
use crate::stats::{GoodnessOfFit, SampleStatistics};

/// Degrees of freedom used for every goodness-of-fit probability.
pub const DEGREES_OF_FREEDOM: f64 = 1.0;

/// Candidate travel-time model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Normal,
    Uniform,
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionKind::Normal => f.write_str("normal"),
            DistributionKind::Uniform => f.write_str("uniform"),
        }
    }
}

impl GoodnessOfFit {
    /// Right-tail probability `P(χ²₁ ≥ statistic)`.
    pub fn tail_probability(&self) -> f64 {
        special::chi_squared_sf(self.chi_square, DEGREES_OF_FREEDOM)
    }
}

/// Picks the winning model from the two tail probabilities.
///
/// `None` marks a disqualified model. Normal wins ties.
///
/// # Examples
/// ```
/// use netcenter::selection::{choose, DistributionKind};
/// assert_eq!(choose(Some(0.2), Some(0.2)), Some(DistributionKind::Normal));
/// assert_eq!(choose(Some(0.1), Some(0.4)), Some(DistributionKind::Uniform));
/// assert_eq!(choose(None, None), None);
/// ```
pub fn choose(normal: Option<f64>, uniform: Option<f64>) -> Option<DistributionKind> {
    match (normal, uniform) {
        (Some(pn), Some(pu)) if pn >= pu => Some(DistributionKind::Normal),
        (Some(_), Some(_)) => Some(DistributionKind::Uniform),
        (Some(_), None) => Some(DistributionKind::Normal),
        (None, Some(_)) => Some(DistributionKind::Uniform),
        (None, None) => None,
    }
}

/// Parameters of the selected model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FittedDistribution {
    /// Mean `E` and spread `Ω`.
    Normal { mean: f64, spread: f64 },
    /// Bounds `a` and `b`; `b < a` is possible and kept as fitted.
    Uniform { lower: f64, upper: f64 },
}

impl FittedDistribution {
    /// Model family of these parameters.
    pub fn kind(&self) -> DistributionKind {
        match self {
            FittedDistribution::Normal { .. } => DistributionKind::Normal,
            FittedDistribution::Uniform { .. } => DistributionKind::Uniform,
        }
    }

    /// Edge weight for a draw `z ∈ [0, 1)`, clamped at zero.
    ///
    /// Normal: `E + Ω·z`. Uniform: `a + (b − a)·z`.
    pub fn weight(&self, z: f64) -> f64 {
        let w = match *self {
            FittedDistribution::Normal { mean, spread } => mean + spread * z,
            FittedDistribution::Uniform { lower, upper } => lower + (upper - lower) * z,
        };
        w.max(0.0)
    }
}

/// Winning model for one edge with its test result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionFit {
    pub edge: EdgeId,
    pub distribution: FittedDistribution,
    /// Chi-square statistic of the winning model.
    pub chi_square: f64,
    /// Right-tail probability of the winning model.
    pub probability: f64,
}

impl DistributionFit {
    /// Applies the selection rule to one edge's statistics.
    ///
    /// # Errors
    /// [`Error::NoViableDistribution`] if both models were disqualified.
    pub fn select(stats: &SampleStatistics) -> Result<Self> {
        let normal = stats.normal().as_ref().ok();
        let uniform = stats.uniform().as_ref().ok();
        let p = |fit: Option<&GoodnessOfFit>| fit.map(GoodnessOfFit::tail_probability);

        let winner = match choose(p(normal), p(uniform)) {
            Some(DistributionKind::Normal) => normal,
            Some(DistributionKind::Uniform) => uniform,
            None => None,
        }
        .ok_or_else(|| Error::NoViableDistribution(stats.edge().to_string()))?;

        let distribution = match winner.kind {
            DistributionKind::Normal => FittedDistribution::Normal {
                mean: stats.mean(),
                spread: stats.spread(),
            },
            DistributionKind::Uniform => {
                let (lower, upper) = stats.uniform_bounds();
                FittedDistribution::Uniform { lower, upper }
            }
        };

        Ok(Self {
            edge: stats.edge().clone(),
            distribution,
            chi_square: winner.chi_square,
            probability: winner.tail_probability(),
        })
    }

    /// Model family that won the selection.
    pub fn kind(&self) -> DistributionKind {
        self.distribution.kind()
    }
}

/// Statistics and selected model for one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct FitEntry {
    pub statistics: SampleStatistics,
    pub fit: DistributionFit,
}

/// Fitted distributions for every edge of the sample table, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct FitTable {
    entries: Vec<FitEntry>,
}

impl FitTable {
    /// Fits every edge, failing fast on the first unusable one.
    ///
    /// # Errors
    /// - [`Error::DuplicateEdge`] if an undirected edge appears twice.
    /// - Any error from [`SampleStatistics::compute`] or
    ///   [`DistributionFit::select`].
    pub fn fit(samples: &[EdgeSample]) -> Result<Self> {
        Self::from_statistics(samples.iter().map(SampleStatistics::compute))
    }

    /// Applies the selection rule to already computed statistics.
    ///
    /// Consumes `statistics` lazily and stops at the first error.
    ///
    /// # Errors
    /// The first error yielded by `statistics`, [`Error::DuplicateEdge`],
    /// or [`Error::NoViableDistribution`] from [`DistributionFit::select`].
    pub fn from_statistics<I>(statistics: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<SampleStatistics>>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for statistics in statistics {
            let statistics = statistics?;
            let (lo, hi) = statistics.edge().key();
            if !seen.insert((lo.to_owned(), hi.to_owned())) {
                return Err(Error::DuplicateEdge(statistics.edge().to_string()));
            }
            let fit = DistributionFit::select(&statistics)?;
            debug!(
                edge = %fit.edge,
                kind = %fit.kind(),
                chi_square = fit.chi_square,
                probability = fit.probability,
                "selected travel-time distribution"
            );
            entries.push(FitEntry { statistics, fit });
        }

        Ok(Self { entries })
    }

    /// Per-edge statistics and fits, in input order.
    pub fn entries(&self) -> &[FitEntry] {
        &self.entries
    }

    /// Selected model of every edge, in input order.
    pub fn fits(&self) -> impl Iterator<Item = &DistributionFit> {
        self.entries.iter().map(|e| &e.fit)
    }

    /// Number of fitted edges.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no edge was fitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vertex set spanned by the fitted edges.
    pub fn vertices(&self) -> VertexSet {
        VertexSet::new(self.fits().flat_map(|f| {
            [f.edge.origin().to_owned(), f.edge.destination().to_owned()]
        }))
    }
}
