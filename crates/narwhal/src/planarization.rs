//! Topology stage: a validated graph, its planar embedding and the face structure.

use crate::dcel::{Dcel, FaceIx, VertexIx};
use crate::embedding::{self, PlanarEmbedding};
use crate::error::{Error, Result};
use crate::graph::{Graph, IndexedGraph, Point, Positions};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Planarization {
    graph: IndexedGraph,
    embedding: PlanarEmbedding,
    positions: Option<Vec<Point>>,
    dcel: Dcel,
    external: FaceIx,
}

impl Planarization {
    pub fn new(graph: &Graph, positions: Option<&Positions>) -> Result<Self> {
        let graph = graph.validate()?;
        let positions = positions
            .map(|p| embedding::resolve_positions(&graph, p))
            .transpose()?;
        let embedding = embedding::build(&graph, positions.as_deref())?;
        let mut dcel = Dcel::from_embedding(&graph, &embedding)?;

        let external = match &positions {
            Some(pos) => external_from_positions(&graph, &dcel, pos)?,
            None => longest_face(&dcel),
        };
        dcel.set_external(external);

        let euler = dcel.euler_characteristic();
        if euler != 2 {
            return Err(Error::invariant(
                "planarization",
                format!("V - E + F = {euler}"),
            ));
        }
        debug!(
            vertices = dcel.vertex_count(),
            edges = dcel.edge_count(),
            faces = dcel.face_count(),
            external = external.0,
            "planarization"
        );
        Ok(Self {
            graph,
            embedding,
            positions,
            dcel,
            external,
        })
    }

    pub fn graph(&self) -> &IndexedGraph {
        &self.graph
    }

    pub fn embedding(&self) -> &PlanarEmbedding {
        &self.embedding
    }

    /// Input positions in vertex order, when the caller supplied them.
    pub fn positions(&self) -> Option<&[Point]> {
        self.positions.as_deref()
    }

    pub fn dcel(&self) -> &Dcel {
        &self.dcel
    }

    pub fn external_face(&self) -> FaceIx {
        self.external
    }

    /// Independent copy of the face structure, for stages that insert vertices.
    pub fn working_copy(&self) -> Dcel {
        self.dcel.clone()
    }

    pub fn dfs_face_order(&self) -> Vec<FaceIx> {
        self.dcel.dual_dfs(self.external)
    }
}

/// Longest face; ties go to the lowest index.
fn longest_face(dcel: &Dcel) -> FaceIx {
    let mut best = FaceIx(0);
    for f in dcel.face_ixs() {
        if dcel.face(f).len > dcel.face(best).len {
            best = f;
        }
    }
    best
}

/// Unbounded face of a straight-line drawing, found at the leftmost (then lowest) vertex.
fn external_from_positions(graph: &IndexedGraph, dcel: &Dcel, pos: &[Point]) -> Result<FaceIx> {
    let Some(corner) = (0..graph.vertex_count()).min_by(|&a, &b| {
        pos[a]
            .x
            .total_cmp(&pos[b].x)
            .then(pos[a].y.total_cmp(&pos[b].y))
    }) else {
        return Ok(FaceIx(0));
    };

    let upness = |w: usize| {
        let dx = pos[w].x - pos[corner].x;
        let dy = pos[w].y - pos[corner].y;
        dy / dx.hypot(dy)
    };
    let Some(nbr) = graph
        .neighbors(corner)
        .max_by(|&a, &b| upness(a).total_cmp(&upness(b)).then(b.cmp(&a)))
    else {
        return Ok(FaceIx(0));
    };

    // The sector counter-clockwise after the steepest edge at the leftmost vertex contains the
    // direction -x, so it belongs to the unbounded face.
    let Some(he) = dcel.half_edge_between(VertexIx(nbr), VertexIx(corner)) else {
        return Err(Error::invariant(
            "planarization",
            format!("no half-edge {nbr} -> {corner}"),
        ));
    };
    Ok(dcel.face_of(he))
}
