//! Planar embeddings (rotation systems).
//!
//! An embedding stores, for every vertex, its neighbors in counter-clockwise order. Faces are
//! traced with `next(u -> v) = v -> w` where `w` follows `u` counter-clockwise around `v`; each
//! half-edge then has its face on the right-hand side.

use crate::error::{Error, Result};
use crate::graph::{IndexedGraph, Point, Positions};
use crate::planarity;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarEmbedding {
    rotation: Vec<Vec<usize>>,
}

impl PlanarEmbedding {
    pub fn from_rotation(rotation: Vec<Vec<usize>>) -> Self {
        Self { rotation }
    }

    pub fn vertex_count(&self) -> usize {
        self.rotation.len()
    }

    /// Neighbors of `v` in counter-clockwise order.
    pub fn rotation(&self, v: usize) -> &[usize] {
        &self.rotation[v]
    }

    /// The neighbor following `u` counter-clockwise around `v`.
    pub fn ccw_after(&self, v: usize, u: usize) -> Option<usize> {
        let rot = &self.rotation[v];
        let pos = rot.iter().position(|&w| w == u)?;
        Some(rot[(pos + 1) % rot.len()])
    }

    /// Every neighbor entry is unique and mirrored by the neighbor's own rotation.
    pub fn check_structure(&self) -> bool {
        self.rotation.iter().enumerate().all(|(v, rot)| {
            rot.iter().enumerate().all(|(i, &w)| {
                w < self.rotation.len()
                    && w != v
                    && !rot[..i].contains(&w)
                    && self.rotation[w].contains(&v)
            })
        })
    }

    pub fn edge_count(&self) -> usize {
        self.rotation.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Number of face cycles of the rotation system (1 for an edgeless graph).
    pub fn face_count(&self) -> usize {
        let mut visited: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut faces: usize = 0;
        for (v, rot) in self.rotation.iter().enumerate() {
            for &w in rot {
                if visited.contains(&(v, w)) {
                    continue;
                }
                faces += 1;
                let (mut a, mut b) = (v, w);
                while visited.insert((a, b)) {
                    let Some(c) = self.ccw_after(b, a) else {
                        break;
                    };
                    (a, b) = (b, c);
                }
            }
        }
        faces.max(1)
    }

    /// Euler's formula for a connected embedding: `V - E + F = 2`.
    pub fn is_planar(&self) -> bool {
        let v = self.vertex_count() as i64;
        let e = self.edge_count() as i64;
        let f = self.face_count() as i64;
        v == 0 || v - e + f == 2
    }
}

/// Builds the embedding from positions when given, otherwise by planarity testing.
pub fn build(graph: &IndexedGraph, positions: Option<&[Point]>) -> Result<PlanarEmbedding> {
    let embedding = match positions {
        Some(pos) => from_positions(graph, pos)?,
        None => planarity::embed(graph)?,
    };
    if !embedding.check_structure() {
        return Err(Error::invariant(
            "planarization",
            "rotation system is not symmetric",
        ));
    }
    if !embedding.is_planar() {
        return Err(Error::invariant(
            "planarization",
            "rotation system violates Euler's formula",
        ));
    }
    Ok(embedding)
}

/// Resolves caller positions to vertex order.
pub fn resolve_positions(graph: &IndexedGraph, positions: &Positions) -> Result<Vec<Point>> {
    (0..graph.vertex_count())
        .map(|v| {
            let vertex = graph.id(v);
            let Some(&p) = positions.get(vertex) else {
                return Err(Error::MissingPosition {
                    vertex: vertex.to_string(),
                });
            };
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(Error::NonFinitePosition {
                    vertex: vertex.to_string(),
                });
            }
            Ok(p)
        })
        .collect()
}

/// Rotation system of a straight-line drawing; rejects drawings with crossings.
pub fn from_positions(graph: &IndexedGraph, pos: &[Point]) -> Result<PlanarEmbedding> {
    for &(v, w) in graph.edges() {
        if pos[v] == pos[w] {
            return Err(Error::CoincidentPositions {
                from: graph.id(v).to_string(),
                to: graph.id(w).to_string(),
            });
        }
    }

    let edges = graph.edges();
    for (i, &(a, b)) in edges.iter().enumerate() {
        for &(c, d) in &edges[i + 1..] {
            if a == c || a == d || b == c || b == d {
                continue;
            }
            if segments_intersect(pos[a], pos[b], pos[c], pos[d]) {
                return Err(Error::CrossingEdges {
                    first: (graph.id(a).to_string(), graph.id(b).to_string()),
                    second: (graph.id(c).to_string(), graph.id(d).to_string()),
                });
            }
        }
    }

    let rotation: Vec<Vec<usize>> = (0..graph.vertex_count())
        .map(|v| {
            let mut nbrs: Vec<(f64, usize)> = graph
                .neighbors(v)
                .map(|w| ((pos[w].y - pos[v].y).atan2(pos[w].x - pos[v].x), w))
                .collect();
            nbrs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            nbrs.into_iter().map(|(_, w)| w).collect()
        })
        .collect();
    Ok(PlanarEmbedding::from_rotation(rotation))
}

fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed-segment intersection; touching and collinear overlap count.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
    {
        return true;
    }
    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}
