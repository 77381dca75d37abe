//! Error types for the simulation pipeline.

use thiserror::Error;

use crate::selection::DistributionKind;

/// Error type for fitting, synthesis and simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Edge identifier is not of the form `origin:destination`.
    #[error("malformed edge identifier {0:?}, expected \"origin:destination\"")]
    MalformedEdgeId(String),

    /// The same undirected edge appears twice in the sample table.
    #[error("edge {0} appears more than once in the sample table")]
    DuplicateEdge(String),

    /// An edge references a vertex that is not in the vertex set.
    #[error("vertex {0:?} is not part of the vertex set")]
    UnknownVertex(String),

    /// Not enough information in an edge's samples to estimate a spread.
    #[error("edge {edge} has insufficient data: {reason}")]
    InsufficientData { edge: String, reason: String },

    /// A goodness-of-fit bin has zero expected count, disqualifying the model.
    #[error("edge {edge}: {kind} model has a degenerate bin (bin {bin})")]
    DegenerateBin {
        edge: String,
        kind: DistributionKind,
        bin: usize,
    },

    /// Both candidate models were disqualified for an edge.
    #[error("edge {0} has no viable distribution")]
    NoViableDistribution(String),

    /// A random draw outside `[0, 1)` was supplied to the synthesizer.
    #[error("random draw {0} is outside [0, 1)")]
    InvalidDraw(f64),

    /// Draw vector length does not match the number of fitted edges.
    #[error("expected {expected} per-edge draws, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Simulation configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_edge() {
        let err = Error::InsufficientData {
            edge: "1:2".into(),
            reason: "1 observation".into(),
        };
        assert_eq!(err.to_string(), "edge 1:2 has insufficient data: 1 observation");

        let err = Error::DegenerateBin {
            edge: "A:B".into(),
            kind: DistributionKind::Uniform,
            bin: 3,
        };
        assert_eq!(
            err.to_string(),
            "edge A:B: uniform model has a degenerate bin (bin 3)"
        );
    }

    #[test]
    fn test_invalid_draw_message() {
        assert_eq!(
            Error::InvalidDraw(1.5).to_string(),
            "random draw 1.5 is outside [0, 1)"
        );
    }
}
