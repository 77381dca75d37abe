//! Edge identifiers, raw travel-time samples and the vertex set.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Undirected edge identifier parsed from `"origin:destination"`.
///
/// Orientation is kept for display; [`EdgeId::key`] gives the unordered pair.
/// Serializes as its `origin:destination` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeId {
    origin: String,
    destination: String,
}

impl EdgeId {
    /// Parses an identifier of the form `origin:destination`.
    ///
    /// # Errors
    /// [`Error::MalformedEdgeId`] if there is no separator, either endpoint
    /// is empty, or the destination contains a second separator.
    ///
    /// # Examples
    /// ```
    /// use netcenter::edge::EdgeId;
    /// let id = EdgeId::parse("3:5").unwrap();
    /// assert_eq!(id.origin(), "3");
    /// assert_eq!(id.destination(), "5");
    /// assert!(EdgeId::parse("35").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            Some((origin, destination))
                if !origin.is_empty() && !destination.is_empty() && !destination.contains(':') =>
            {
                Ok(Self {
                    origin: origin.to_owned(),
                    destination: destination.to_owned(),
                })
            }
            _ => Err(Error::MalformedEdgeId(raw.to_owned())),
        }
    }

    /// First endpoint as written in the identifier.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Second endpoint as written in the identifier.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Unordered endpoint pair, smaller label first.
    pub fn key(&self) -> (&str, &str) {
        if self.origin <= self.destination {
            (&self.origin, &self.destination)
        } else {
            (&self.destination, &self.origin)
        }
    }

    /// `true` if both endpoints are the same vertex.
    pub fn is_self_loop(&self) -> bool {
        self.origin == self.destination
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin, self.destination)
    }
}

impl Serialize for EdgeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Repeated travel-time observations for one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSample {
    id: EdgeId,
    observations: Vec<u32>,
}

impl EdgeSample {
    /// Creates a sample from a raw identifier and its observations.
    ///
    /// Observation count is not checked here; fitting reports
    /// [`Error::InsufficientData`] for that edge instead.
    pub fn new(id: &str, observations: impl Into<Vec<u32>>) -> Result<Self> {
        Ok(Self {
            id: EdgeId::parse(id)?,
            observations: observations.into(),
        })
    }

    /// Edge the observations were taken on.
    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    /// Travel-time observations in recording order.
    pub fn observations(&self) -> &[u32] {
        &self.observations
    }
}

/// Deduplicated, lexicographically ordered vertex labels.
///
/// Vertex indices used by networks and distance matrices are positions in
/// this ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VertexSet {
    labels: Vec<String>,
}

impl VertexSet {
    /// Builds a vertex set from arbitrary labels.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        Self {
            labels: unique.into_iter().collect(),
        }
    }

    /// Collects every endpoint named by the sample table.
    pub fn from_samples(samples: &[EdgeSample]) -> Self {
        Self::new(
            samples
                .iter()
                .flat_map(|s| [s.id.origin(), s.id.destination()]),
        )
    }

    /// Number of distinct vertices.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// `true` if the set holds no vertex.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in index order.
    ///
    /// # Examples
    /// ```
    /// use netcenter::edge::VertexSet;
    /// let vertices = VertexSet::new(["b", "a", "b"]);
    /// assert_eq!(vertices.labels(), ["a", "b"]);
    /// ```
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label of vertex `index`, if in range.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Position of `label` in the ordering.
    ///
    /// # Complexity
    /// O(log n) binary search.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .ok()
    }

    /// Resolves both endpoints of an edge to vertex indices.
    ///
    /// # Errors
    /// [`Error::UnknownVertex`] for the first endpoint not in the set.
    pub fn resolve(&self, id: &EdgeId) -> Result<(usize, usize)> {
        let lookup = |label: &str| {
            self.index_of(label)
                .ok_or_else(|| Error::UnknownVertex(label.to_owned()))
        };
        Ok((lookup(id.origin())?, lookup(id.destination())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edge_id() {
        let id = EdgeId::parse("B:A").unwrap();
        assert_eq!(id.origin(), "B");
        assert_eq!(id.destination(), "A");
        assert_eq!(id.key(), ("A", "B"));
        assert_eq!(id.to_string(), "B:A");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["", "AB", ":B", "A:", "A:B:C"] {
            assert_eq!(
                EdgeId::parse(raw),
                Err(Error::MalformedEdgeId(raw.to_owned())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_self_loop_detection() {
        assert!(EdgeId::parse("4:4").unwrap().is_self_loop());
        assert!(!EdgeId::parse("4:5").unwrap().is_self_loop());
    }

    #[test]
    fn test_vertex_set_from_samples() {
        let samples = vec![
            EdgeSample::new("3:2", vec![1, 2]).unwrap(),
            EdgeSample::new("1:3", vec![1, 2]).unwrap(),
            EdgeSample::new("1:2", vec![1, 2]).unwrap(),
        ];
        let vertices = VertexSet::from_samples(&samples);
        assert_eq!(vertices.labels(), ["1", "2", "3"]);
        assert_eq!(vertices.index_of("3"), Some(2));
        assert_eq!(vertices.index_of("9"), None);
    }

    #[test]
    fn test_vertex_order_is_lexicographic() {
        let vertices = VertexSet::new(["10", "2", "1"]);
        assert_eq!(vertices.labels(), ["1", "10", "2"]);
    }

    #[test]
    fn test_resolve_unknown_vertex() {
        let vertices = VertexSet::new(["A", "B"]);
        let id = EdgeId::parse("A:C").unwrap();
        assert_eq!(vertices.resolve(&id), Err(Error::UnknownVertex("C".into())));
        let id = EdgeId::parse("B:A").unwrap();
        assert_eq!(vertices.resolve(&id), Ok((1, 0)));
    }
}
