//! Single-source and all-pairs shortest paths.
//!
//! Dijkstra with a linear scan for the next vertex, O(V²) per source. The
//! networks handled here are dense matrices over a few dozen vertices, where a
//! heap buys nothing. When two unsettled vertices share the smallest tentative
//! distance the lower index is settled first.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

use serde::Serialize;

use crate::network::Network;

/// Shortest-path distance, or `Unreachable` when no path exists.
///
/// Orders every finite distance before `Unreachable`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Distance {
    Finite(f64),
    Unreachable,
}

impl Distance {
    /// Distance of a vertex to itself.
    pub const ZERO: Distance = Distance::Finite(0.0);

    /// Numeric distance, or `None` when unreachable.
    pub fn finite(self) -> Option<f64> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Unreachable => None,
        }
    }

    /// `true` for a finite distance.
    pub fn is_reachable(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    /// Larger of two distances; `Unreachable` absorbs.
    pub fn max(self, other: Distance) -> Distance {
        match (self, other) {
            (Distance::Finite(a), Distance::Finite(b)) => Distance::Finite(a.max(b)),
            _ => Distance::Unreachable,
        }
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Distance) -> Distance {
        match (self, rhs) {
            (Distance::Finite(a), Distance::Finite(b)) => Distance::Finite(a + b),
            _ => Distance::Unreachable,
        }
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Distance::Finite(a), Distance::Finite(b)) => a.partial_cmp(b),
            (Distance::Finite(_), Distance::Unreachable) => Some(Ordering::Less),
            (Distance::Unreachable, Distance::Finite(_)) => Some(Ordering::Greater),
            (Distance::Unreachable, Distance::Unreachable) => Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{d}"),
            Distance::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Distances from `source` to every vertex of `network`.
///
/// # Panics
/// Panics if `source >= network.order()`.
pub fn dijkstra(network: &Network, source: usize) -> Vec<Distance> {
    let n = network.order();
    assert!(source < n, "source vertex {source} out of range for order {n}");

    let mut dist = vec![Distance::Unreachable; n];
    let mut settled = vec![false; n];
    dist[source] = Distance::ZERO;

    loop {
        // Strict `<` keeps the lowest index among equal candidates.
        let mut next: Option<(usize, f64)> = None;
        for (v, d) in dist.iter().enumerate() {
            if settled[v] {
                continue;
            }
            if let Distance::Finite(d) = *d {
                if next.map_or(true, |(_, best)| d < best) {
                    next = Some((v, d));
                }
            }
        }
        let Some((u, du)) = next else { break };
        settled[u] = true;

        for (v, w) in network.row(u).iter().enumerate() {
            let Some(w) = *w else { continue };
            if settled[v] {
                continue;
            }
            let candidate = du + w;
            if dist[v].finite().map_or(true, |d| candidate < d) {
                dist[v] = Distance::Finite(candidate);
            }
        }
    }

    dist
}

/// Square matrix of shortest-path distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    order: usize,
    cells: Vec<Distance>,
}

impl DistanceMatrix {
    /// Runs [`dijkstra`] from every vertex.
    ///
    /// # Examples
    /// ```
    /// use netcenter::network::Network;
    /// use netcenter::shortest_path::{DistanceMatrix, Distance};
    /// let net = Network::from_edges(3, &[(0, 1, 2.0), (1, 2, 3.0), (0, 2, 10.0)]);
    /// let d = DistanceMatrix::all_pairs(&net);
    /// assert_eq!(d.get(0, 2), Distance::Finite(5.0));
    /// ```
    pub fn all_pairs(network: &Network) -> Self {
        let order = network.order();
        let cells = (0..order).flat_map(|s| dijkstra(network, s)).collect();
        Self { order, cells }
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Distance from `i` to `j`.
    ///
    /// # Panics
    /// Panics if an index is `>= order()`.
    pub fn get(&self, i: usize, j: usize) -> Distance {
        assert!(i < self.order && j < self.order, "vertex index out of range");
        self.cells[i * self.order + j]
    }

    /// Distances out of vertex `i`.
    pub fn row(&self, i: usize) -> &[Distance] {
        &self.cells[i * self.order..(i + 1) * self.order]
    }

    /// Distances into vertex `j`.
    pub fn column(&self, j: usize) -> impl Iterator<Item = Distance> + '_ {
        self.cells.iter().skip(j).step_by(self.order.max(1)).copied()
    }

    /// Matrix rows, for presentation.
    pub fn rows(&self) -> impl Iterator<Item = &[Distance]> {
        self.cells.chunks(self.order.max(1)).take(self.order)
    }
}
