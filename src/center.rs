//! Eccentricities and the center of one distance matrix.

use serde::Serialize;

use crate::shortest_path::{Distance, DistanceMatrix};

/// Eccentricities of one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiusRecord {
    pub vertex: usize,
    /// Largest distance into the vertex.
    pub external: Distance,
    /// Largest distance out of the vertex.
    pub internal: Distance,
    /// `external + internal`; unreachable if either part is.
    pub sum: Distance,
}

impl RadiusRecord {
    /// Whether the vertex may be chosen as center.
    pub fn is_eligible(&self) -> bool {
        self.sum.is_reachable()
    }
}

fn eccentricity(distances: impl IntoIterator<Item = Distance>) -> Distance {
    distances.into_iter().fold(Distance::ZERO, Distance::max)
}

/// Radius table of one trial plus its center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenterReport {
    records: Vec<RadiusRecord>,
    center: Option<usize>,
}

impl CenterReport {
    /// Computes every vertex's eccentricities and picks the center.
    ///
    /// The center is the first vertex, in index order, with the smallest
    /// finite sum. Vertices with an unreachable eccentricity are never
    /// chosen; if every vertex is excluded there is no center.
    pub fn analyze(distances: &DistanceMatrix) -> Self {
        let records: Vec<RadiusRecord> = (0..distances.order())
            .map(|v| {
                let external = eccentricity(distances.column(v));
                let internal = eccentricity(distances.row(v).iter().copied());
                RadiusRecord {
                    vertex: v,
                    external,
                    internal,
                    sum: external + internal,
                }
            })
            .collect();

        let mut center: Option<(usize, f64)> = None;
        for record in &records {
            if let Some(sum) = record.sum.finite() {
                if center.map_or(true, |(_, best)| sum < best) {
                    center = Some((record.vertex, sum));
                }
            }
        }

        Self {
            records,
            center: center.map(|(v, _)| v),
        }
    }

    /// One record per vertex, in index order.
    pub fn records(&self) -> &[RadiusRecord] {
        &self.records
    }

    /// Index of the center vertex, if any vertex was eligible.
    pub fn center(&self) -> Option<usize> {
        self.center
    }

    /// Record of the center vertex, if any.
    pub fn center_record(&self) -> Option<&RadiusRecord> {
        self.center.map(|v| &self.records[v])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    fn report(order: usize, edges: &[(usize, usize, f64)]) -> CenterReport {
        CenterReport::analyze(&DistanceMatrix::all_pairs(&Network::from_edges(order, edges)))
    }

    #[test]
    fn test_triangle_uses_shortest_paths() {
        let r = report(3, &[(0, 1, 2.0), (1, 2, 3.0), (0, 2, 10.0)]);
        let a = r.records()[0];
        assert_eq!(a.internal, Distance::Finite(5.0));
        assert_eq!(a.external, Distance::Finite(5.0));
        assert_eq!(a.sum, Distance::Finite(10.0));
        // B reaches A in 2 and C in 3.
        assert_eq!(r.records()[1].sum, Distance::Finite(6.0));
        assert_eq!(r.center(), Some(1));
        assert_eq!(r.center_record().map(|rec| rec.vertex), Some(1));
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let r = report(2, &[(0, 1, 4.0)]);
        assert_eq!(r.records()[0].sum, r.records()[1].sum);
        assert_eq!(r.center(), Some(0));
    }

    #[test]
    fn test_disconnected_graph_has_no_center() {
        let r = report(3, &[(0, 1, 1.0)]);
        assert!(r.records().iter().all(|rec| !rec.is_eligible()));
        assert_eq!(r.center(), None);
        assert_eq!(r.center_record(), None);
    }

    #[test]
    fn test_single_vertex_is_its_own_center() {
        let r = report(1, &[]);
        assert_eq!(r.records()[0].sum, Distance::ZERO);
        assert_eq!(r.center(), Some(0));
        assert_eq!(report(0, &[]).center(), None);
    }

    #[test]
    fn test_star_center() {
        let r = report(4, &[(2, 0, 1.0), (2, 1, 1.0), (2, 3, 1.0)]);
        assert_eq!(r.center(), Some(2));
        assert_eq!(r.records()[2].sum, Distance::Finite(2.0));
        assert_eq!(r.records()[0].sum, Distance::Finite(4.0));
    }
}
