//! Presentation tables for external renderers.
//!
//! Every row is plain data keyed by vertex or edge labels and derives
//! `Serialize`, so a report writer or chart tool can consume it without
//! touching the simulation types.

use serde::Serialize;

use crate::center::CenterReport;
use crate::edge::VertexSet;
use crate::network::{Network, NetworkDraws, NetworkSynthesizer};
use crate::selection::{DistributionKind, FitTable, FittedDistribution};
use crate::shortest_path::{Distance, DistanceMatrix};
use crate::simulation::CenterTally;

/// One model's goodness-of-fit result for one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoodnessOfFitRow {
    pub edge: String,
    pub model: DistributionKind,
    pub mean: f64,
    pub spread: f64,
    /// `E − Ω` for the normal model, `a` for the uniform model.
    pub lower: f64,
    /// `E + Ω` for the normal model, `b` for the uniform model.
    pub upper: f64,
    /// Bin counts O1–O4; absent when the model was disqualified.
    pub observed: Option<[usize; 4]>,
    pub chi_square: Option<f64>,
    pub probability: Option<f64>,
    /// Why the model was disqualified.
    pub rejection: Option<String>,
}

/// Both models for every edge, normal first.
pub fn goodness_of_fit_rows(fits: &FitTable) -> Vec<GoodnessOfFitRow> {
    let mut rows = Vec::with_capacity(fits.len() * 2);
    for entry in fits.entries() {
        let stats = &entry.statistics;
        let (mean, spread) = (stats.mean(), stats.spread());
        let (a, b) = stats.uniform_bounds();
        for (model, result, lower, upper) in [
            (DistributionKind::Normal, stats.normal(), mean - spread, mean + spread),
            (DistributionKind::Uniform, stats.uniform(), a, b),
        ] {
            let fit = result.as_ref().ok();
            rows.push(GoodnessOfFitRow {
                edge: stats.edge().to_string(),
                model,
                mean,
                spread,
                lower,
                upper,
                observed: fit.map(|g| g.observed),
                chi_square: fit.map(|g| g.chi_square),
                probability: fit.map(|g| g.tail_probability()),
                rejection: result.as_ref().err().map(ToString::to_string),
            });
        }
    }
    rows
}

/// Selected model for one edge and the draw it received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionRow {
    pub edge: String,
    pub distribution: FittedDistribution,
    pub chi_square: f64,
    pub probability: f64,
    pub draw: Option<f64>,
    /// Weight the edge received from `draw`.
    pub weight: Option<f64>,
}

/// Selection table, with the draws of one run when given.
///
/// `synthesizer` must have been built from `fits`.
pub fn selection_rows(
    fits: &FitTable,
    synthesizer: &NetworkSynthesizer,
    draws: Option<&NetworkDraws>,
) -> Vec<SelectionRow> {
    fits.fits()
        .enumerate()
        .map(|(index, fit)| {
            let draw = draws.and_then(|d| synthesizer.edge_draw(index, d));
            SelectionRow {
                edge: fit.edge.to_string(),
                distribution: fit.distribution,
                chi_square: fit.chi_square,
                probability: fit.probability,
                draw,
                weight: draw.map(|z| fit.distribution.weight(z)),
            }
        })
        .collect()
}

/// Labelled square matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixView<T> {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<T>>,
}

/// Weighted adjacency matrix; `None` marks "no edge".
pub fn network_view(vertices: &VertexSet, network: &Network) -> MatrixView<Option<f64>> {
    MatrixView {
        labels: vertices.labels().to_vec(),
        rows: network.rows().map(<[_]>::to_vec).collect(),
    }
}

/// Shortest-path matrix; unreachable cells serialize as `null`.
pub fn distance_view(vertices: &VertexSet, distances: &DistanceMatrix) -> MatrixView<Distance> {
    MatrixView {
        labels: vertices.labels().to_vec(),
        rows: distances.rows().map(<[_]>::to_vec).collect(),
    }
}

/// Eccentricities of one vertex in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusRow {
    pub vertex: String,
    pub external: Distance,
    pub internal: Distance,
    pub sum: Distance,
    pub is_center: bool,
}

/// Radius table of one run with the center flagged.
pub fn radius_rows(vertices: &VertexSet, report: &CenterReport) -> Vec<RadiusRow> {
    vertices
        .labels()
        .iter()
        .zip(report.records())
        .map(|(label, record)| RadiusRow {
            vertex: label.clone(),
            external: record.external,
            internal: record.internal,
            sum: record.sum,
            is_center: report.center() == Some(record.vertex),
        })
        .collect()
}

/// One histogram bar of the center tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub vertex: String,
    pub count: u64,
    /// Share of all recorded trials.
    pub frequency: f64,
}

/// Center frequencies in vertex order.
pub fn histogram(vertices: &VertexSet, tally: &CenterTally) -> Vec<HistogramBin> {
    vertices
        .labels()
        .iter()
        .enumerate()
        .map(|(v, label)| HistogramBin {
            vertex: label.clone(),
            count: tally.count(v),
            frequency: tally.frequency(v),
        })
        .collect()
}
