#![forbid(unsafe_code)]

//! Orthogonal graph layout using the topology-shape-metrics approach.
//!
//! A connected planar graph of maximum degree 4 is laid out on an integer grid so that every
//! edge is a chain of horizontal and vertical segments:
//!
//! 1. [`Planarization`]: validate the graph, compute a planar embedding (from the caller's
//!    straight-line drawing or by planarity testing) and build its faces.
//! 2. [`Orthogonalization`]: choose angles and bends with a min-cost flow (fewest bends for the
//!    fixed embedding), optionally refined against soft shape preferences.
//! 3. [`Compaction`]: replace bends with dummy vertices, give every segment a direction and a
//!    length (two more flow solves) and walk the faces to produce coordinates.
//!
//! [`layout`] runs all three stages.

pub mod bends;
pub mod compaction;
pub mod dcel;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod model;
pub mod options;
pub mod orthogonalization;
pub mod planarity;
pub mod planarization;
pub mod screen;
pub mod sides;

pub use compaction::Compaction;
pub use error::{Error, Result};
pub use graph::{Graph, MAX_DEGREE, Point, Positions};
pub use model::{Coord, EdgeRoute, LayoutResult, LayoutStats, NodeKey};
pub use options::{LayoutOptions, RefinementMethod, RefinementOptions};
pub use orthogonalization::{OrthogonalRepresentation, Orthogonalization};
pub use planarization::Planarization;
pub use sides::Side;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lays out `graph` and returns integer coordinates for its vertices and bend points.
///
/// With `positions`, the embedding is taken from that straight-line drawing (which must be free
/// of crossings) and, if `options.preserve_orientation` is set, the result keeps its
/// orientation.
pub fn layout(
    graph: &Graph,
    positions: Option<&Positions>,
    options: &LayoutOptions,
) -> Result<LayoutResult> {
    options.validate()?;
    let timing_enabled = std::env::var("NARWHAL_TIMING")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let total_start = timing_enabled.then(std::time::Instant::now);

    if graph.nodes.len() <= 1 {
        let indexed = graph.validate()?;
        let mut result = LayoutResult::default();
        if indexed.vertex_count() == 1 {
            result
                .positions
                .insert(NodeKey::vertex(indexed.id(0)), Coord::new(0, 0));
            result.stats.faces = 1;
        }
        return Ok(result);
    }

    let planarize_start = timing_enabled.then(std::time::Instant::now);
    let planarization = Planarization::new(graph, positions)?;
    let planarize = planarize_start.map(|s| s.elapsed());

    let shape_start = timing_enabled.then(std::time::Instant::now);
    let mut orthogonalization = Orthogonalization::new(planarization)?;
    if let Some(refinement) = &options.refinement {
        orthogonalization.refine(refinement)?;
    }
    let shape = shape_start.map(|s| s.elapsed());

    let compact_start = timing_enabled.then(std::time::Instant::now);
    let compaction = Compaction::new(&orthogonalization, options)?;
    let result = compaction.layout()?;
    let compact = compact_start.map(|s| s.elapsed());

    tracing::debug!(
        vertices = graph.nodes.len(),
        edges = graph.edges.len(),
        bends = result.stats.bends,
        width = result.stats.width,
        height = result.stats.height,
        "layout"
    );

    if let Some(s) = total_start {
        eprintln!(
            "[narwhal-timing] nodes={} edges={} total={:?} planarize={:?} shape={:?} compact={:?} bends={}",
            graph.nodes.len(),
            graph.edges.len(),
            s.elapsed(),
            planarize.unwrap_or_default(),
            shape.unwrap_or_default(),
            compact.unwrap_or_default(),
            result.stats.bends,
        );
    }
    Ok(result)
}
