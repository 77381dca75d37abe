//! Random network synthesis from fitted edge distributions.
//!
//! A [`Network`] is a dense symmetric adjacency matrix over the vertex set.
//! Absent edges and the diagonal hold `None`, never a zero weight, so the
//! shortest-path engine cannot mistake them for free connections.
//!
//! Synthesis is a pure function of the fitted edges and a [`NetworkDraws`]
//! value; all randomness is drawn up front by [`NetworkSynthesizer::draw`].

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::edge::VertexSet;
use crate::error::{Error, Result};
use crate::random::unit_draw;
use crate::selection::{DistributionFit, DistributionKind, FitTable, FittedDistribution};

/// How normal-fitted edges obtain their draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalDrawMode {
    /// One draw per network, shared by every normal-fitted edge.
    #[default]
    Shared,
    /// An independent draw per normal-fitted edge.
    PerEdge,
}

/// Uniform draws consumed by one synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkDraws {
    /// Draw shared by normal edges in [`NormalDrawMode::Shared`].
    pub shared: f64,
    /// One draw per fitted edge, in fit-table order.
    pub per_edge: Vec<f64>,
}

/// Symmetric weighted adjacency matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    order: usize,
    weights: Vec<Option<f64>>,
}

impl Network {
    /// Creates a network with `order` vertices and no edges.
    pub fn empty(order: usize) -> Self {
        Self {
            order,
            weights: vec![None; order * order],
        }
    }

    /// Builds a network from undirected `(i, j, weight)` triples.
    ///
    /// Self-loops are ignored. Later triples overwrite earlier ones.
    ///
    /// # Panics
    /// Panics if an index is `>= order`.
    pub fn from_edges(order: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut network = Self::empty(order);
        for &(i, j, w) in edges {
            network.connect(i, j, w);
        }
        network
    }

    fn connect(&mut self, i: usize, j: usize, weight: f64) {
        if i == j {
            return;
        }
        self.weights[i * self.order + j] = Some(weight);
        self.weights[j * self.order + i] = Some(weight);
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Weight of edge `(i, j)`.
    ///
    /// `None` if there is no edge, including on the diagonal and for
    /// indices `>= order()`.
    ///
    /// # Examples
    /// ```
    /// use netcenter::network::Network;
    /// let net = Network::from_edges(2, &[(0, 1, 4.0)]);
    /// assert_eq!(net.weight(1, 0), Some(4.0));
    /// assert_eq!(net.weight(1, 1), None);
    /// assert_eq!(net.weight(0, 7), None);
    /// ```
    pub fn weight(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.order || j >= self.order {
            return None;
        }
        self.weights[i * self.order + j]
    }

    /// Row `i` of the matrix; `i` must be `< order()`.
    pub(crate) fn row(&self, i: usize) -> &[Option<f64>] {
        &self.weights[i * self.order..(i + 1) * self.order]
    }

    /// Matrix rows, for presentation.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.weights.chunks(self.order.max(1)).take(self.order)
    }
}

#[derive(Debug, Clone)]
struct ResolvedEdge {
    i: usize,
    j: usize,
    distribution: FittedDistribution,
}

/// Turns fitted edge distributions plus random draws into networks.
#[derive(Debug, Clone)]
pub struct NetworkSynthesizer {
    order: usize,
    edges: Vec<ResolvedEdge>,
    mode: NormalDrawMode,
}

impl NetworkSynthesizer {
    /// Resolves every fitted edge against `vertices`.
    ///
    /// # Errors
    /// [`Error::UnknownVertex`] or [`Error::DuplicateEdge`].
    pub fn new(vertices: &VertexSet, fits: &FitTable, mode: NormalDrawMode) -> Result<Self> {
        Self::from_fits(vertices, fits.fits(), mode)
    }

    /// Same as [`NetworkSynthesizer::new`] for any sequence of fits.
    pub fn from_fits<'a, I>(vertices: &VertexSet, fits: I, mode: NormalDrawMode) -> Result<Self>
    where
        I: IntoIterator<Item = &'a DistributionFit>,
    {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for fit in fits {
            let (i, j) = vertices.resolve(&fit.edge)?;
            if !seen.insert((i.min(j), i.max(j))) {
                return Err(Error::DuplicateEdge(fit.edge.to_string()));
            }
            edges.push(ResolvedEdge {
                i,
                j,
                distribution: fit.distribution,
            });
        }
        Ok(Self {
            order: vertices.len(),
            edges,
            mode,
        })
    }

    /// Number of vertices of every synthesized network.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of fitted edges, and of per-edge draws a synthesis needs.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Draw mode for normal-fitted edges.
    pub fn mode(&self) -> NormalDrawMode {
        self.mode
    }

    /// Draws everything one synthesis call needs.
    ///
    /// Always consumes `1 + edge_count()` values so that streams stay
    /// aligned across draw modes.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> NetworkDraws {
        let shared = unit_draw(rng);
        let per_edge = (0..self.edges.len()).map(|_| unit_draw(rng)).collect();
        NetworkDraws { shared, per_edge }
    }

    fn applied_draw(&self, edge: &ResolvedEdge, own: f64, shared: f64) -> f64 {
        match (edge.distribution.kind(), self.mode) {
            (DistributionKind::Normal, NormalDrawMode::Shared) => shared,
            _ => own,
        }
    }

    /// Draw applied to edge `index` (fit-table order), if both exist.
    pub fn edge_draw(&self, index: usize, draws: &NetworkDraws) -> Option<f64> {
        let edge = self.edges.get(index)?;
        let own = *draws.per_edge.get(index)?;
        Some(self.applied_draw(edge, own, draws.shared))
    }

    /// Builds the network for one set of draws.
    ///
    /// # Errors
    /// - [`Error::DimensionMismatch`] if `per_edge` does not have one draw
    ///   per edge.
    /// - [`Error::InvalidDraw`] if any draw is outside `[0, 1)`.
    pub fn synthesize(&self, draws: &NetworkDraws) -> Result<Network> {
        if draws.per_edge.len() != self.edges.len() {
            return Err(Error::DimensionMismatch {
                expected: self.edges.len(),
                actual: draws.per_edge.len(),
            });
        }
        if let Some(&bad) = std::iter::once(&draws.shared)
            .chain(&draws.per_edge)
            .find(|z| !(0.0..1.0).contains(*z))
        {
            return Err(Error::InvalidDraw(bad));
        }

        let mut network = Network::empty(self.order);
        for (edge, &own) in self.edges.iter().zip(&draws.per_edge) {
            let z = self.applied_draw(edge, own, draws.shared);
            network.connect(edge.i, edge.j, edge.distribution.weight(z));
        }
        Ok(network)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::edge::EdgeId;
    use proptest::prelude::*;

    fn distribution() -> impl Strategy<Value = FittedDistribution> {
        prop_oneof![
            (0.0_f64..100.0, 0.0_f64..30.0)
                .prop_map(|(mean, spread)| FittedDistribution::Normal { mean, spread }),
            (-50.0_f64..100.0, -50.0_f64..200.0)
                .prop_map(|(lower, upper)| FittedDistribution::Uniform { lower, upper }),
        ]
    }

    fn fits(order: usize) -> impl Strategy<Value = Vec<DistributionFit>> {
        let pairs: Vec<(usize, usize)> = (0..order)
            .flat_map(|i| (i + 1..order).map(move |j| (i, j)))
            .collect();
        proptest::sample::subsequence(pairs.clone(), 0..=pairs.len()).prop_flat_map(|chosen| {
            proptest::collection::vec(distribution(), chosen.len()).prop_map(move |ds| {
                chosen
                    .iter()
                    .zip(ds)
                    .map(|(&(i, j), distribution)| DistributionFit {
                        edge: EdgeId::parse(&format!("v{i}:v{j}")).unwrap(),
                        distribution,
                        chi_square: 0.0,
                        probability: 1.0,
                    })
                    .collect()
            })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn synthesized_network_is_symmetric_and_non_negative(
            fits in fits(6),
            seed in any::<u64>(),
            per_edge in any::<bool>(),
        ) {
            let vertices = VertexSet::new((0..6).map(|i| format!("v{i}")));
            let mode = if per_edge { NormalDrawMode::PerEdge } else { NormalDrawMode::Shared };
            let synth = NetworkSynthesizer::from_fits(&vertices, &fits, mode).unwrap();
            let draws = synth.draw(&mut crate::random::create_rng(seed));
            let net = synth.synthesize(&draws).unwrap();
            prop_assert_eq!(net.order(), vertices.len());
            for i in 0..net.order() {
                prop_assert_eq!(net.weight(i, i), None);
                for j in 0..net.order() {
                    prop_assert_eq!(net.weight(i, j), net.weight(j, i));
                    if let Some(w) = net.weight(i, j) {
                        prop_assert!(w >= 0.0);
                    }
                }
            }
            let edge_cells = (0..6)
                .flat_map(|i| (0..6).map(move |j| (i, j)))
                .filter(|&(i, j)| net.weight(i, j).is_some())
                .count();
            prop_assert_eq!(edge_cells, 2 * fits.len());
        }
    }
}
