//! Doubly connected edge list over a planar embedding.
//!
//! Vertices, half-edges and faces live in flat `Vec`s and refer to each other through typed
//! indices. Edge `i` of the input graph owns half-edges `2i` (`u -> v`) and `2i + 1` (`v -> u`);
//! half-edges created later by [`Dcel::split_edge`] are appended after them.
//!
//! Every half-edge has its face on the right-hand side, so inner faces are walked clockwise and
//! the external face counter-clockwise (y pointing up).

use crate::embedding::PlanarEmbedding;
use crate::error::{Error, Result};
use crate::graph::IndexedGraph;
use crate::model::NodeKey;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

macro_rules! ix {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

ix!(VertexIx);
ix!(HalfEdgeIx);
ix!(FaceIx);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcelVertex {
    pub key: NodeKey,
    /// Any half-edge leaving the vertex; `None` only for an isolated vertex.
    pub half_edge: Option<HalfEdgeIx>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    pub origin: VertexIx,
    pub twin: HalfEdgeIx,
    pub next: HalfEdgeIx,
    pub prev: HalfEdgeIx,
    /// Face on the right-hand side.
    pub face: FaceIx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub half_edge: Option<HalfEdgeIx>,
    pub external: bool,
    /// Number of half-edges on the boundary.
    pub len: usize,
}

/// The three half-edges touched by [`Dcel::split_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub vertex: VertexIx,
    /// `m -> v`, in the face of the split half-edge.
    pub forward: HalfEdgeIx,
    /// `m -> u`, in the face of the twin.
    pub backward: HalfEdgeIx,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dcel {
    vertices: Vec<DcelVertex>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    /// First half-edge (`u -> ...`) of every input edge.
    edge_half_edges: Vec<HalfEdgeIx>,
}

impl Dcel {
    pub fn from_embedding(graph: &IndexedGraph, embedding: &PlanarEmbedding) -> Result<Self> {
        let n = graph.vertex_count();
        let mut by_ends: FxHashMap<(usize, usize), HalfEdgeIx> = FxHashMap::default();
        let mut half_edges: Vec<HalfEdge> = Vec::with_capacity(graph.edge_count() * 2);
        let mut edge_half_edges: Vec<HalfEdgeIx> = Vec::with_capacity(graph.edge_count());
        for (e_ix, &(u, v)) in graph.edges().iter().enumerate() {
            let fwd = HalfEdgeIx(2 * e_ix);
            let bwd = HalfEdgeIx(2 * e_ix + 1);
            by_ends.insert((u, v), fwd);
            by_ends.insert((v, u), bwd);
            edge_half_edges.push(fwd);
            for (origin, twin) in [(u, bwd), (v, fwd)] {
                half_edges.push(HalfEdge {
                    origin: VertexIx(origin),
                    twin,
                    next: twin,
                    prev: twin,
                    face: FaceIx(0),
                });
            }
        }

        for (&(u, v), &he) in &by_ends {
            let Some(w) = embedding.ccw_after(v, u) else {
                return Err(Error::invariant("dcel", format!("vertex {v} misses neighbor {u}")));
            };
            let Some(&next) = by_ends.get(&(v, w)) else {
                return Err(Error::invariant("dcel", format!("no half-edge {v} -> {w}")));
            };
            half_edges[he.0].next = next;
            half_edges[next.0].prev = he;
        }

        let vertices: Vec<DcelVertex> = (0..n)
            .map(|v| DcelVertex {
                key: NodeKey::vertex(graph.id(v)),
                half_edge: embedding
                    .rotation(v)
                    .first()
                    .and_then(|&w| by_ends.get(&(v, w)).copied()),
            })
            .collect();

        let mut dcel = Self {
            vertices,
            half_edges,
            faces: Vec::new(),
            edge_half_edges,
        };
        dcel.trace_faces()?;
        Ok(dcel)
    }

    fn trace_faces(&mut self) -> Result<()> {
        let mut assigned: Vec<bool> = vec![false; self.half_edges.len()];
        for start in 0..self.half_edges.len() {
            if assigned[start] {
                continue;
            }
            let face = FaceIx(self.faces.len());
            let mut len: usize = 0;
            let mut he = HalfEdgeIx(start);
            while !assigned[he.0] {
                assigned[he.0] = true;
                self.half_edges[he.0].face = face;
                len += 1;
                he = self.half_edges[he.0].next;
            }
            if he.0 != start {
                return Err(Error::invariant("dcel", "face cycle does not close"));
            }
            self.faces.push(Face {
                half_edge: Some(HalfEdgeIx(start)),
                external: false,
                len,
            });
        }
        if self.faces.is_empty() {
            self.faces.push(Face {
                half_edge: None,
                external: false,
                len: 0,
            });
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.half_edges.len() / 2
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex(&self, v: VertexIx) -> &DcelVertex {
        &self.vertices[v.0]
    }

    pub fn half_edge(&self, he: HalfEdgeIx) -> &HalfEdge {
        &self.half_edges[he.0]
    }

    pub fn face(&self, f: FaceIx) -> &Face {
        &self.faces[f.0]
    }

    pub fn vertex_ixs(&self) -> impl Iterator<Item = VertexIx> {
        (0..self.vertices.len()).map(VertexIx)
    }

    pub fn half_edge_ixs(&self) -> impl Iterator<Item = HalfEdgeIx> {
        (0..self.half_edges.len()).map(HalfEdgeIx)
    }

    pub fn face_ixs(&self) -> impl Iterator<Item = FaceIx> {
        (0..self.faces.len()).map(FaceIx)
    }

    pub fn origin(&self, he: HalfEdgeIx) -> VertexIx {
        self.half_edges[he.0].origin
    }

    pub fn target(&self, he: HalfEdgeIx) -> VertexIx {
        let twin = self.half_edges[he.0].twin;
        self.half_edges[twin.0].origin
    }

    pub fn twin(&self, he: HalfEdgeIx) -> HalfEdgeIx {
        self.half_edges[he.0].twin
    }

    pub fn next(&self, he: HalfEdgeIx) -> HalfEdgeIx {
        self.half_edges[he.0].next
    }

    pub fn prev(&self, he: HalfEdgeIx) -> HalfEdgeIx {
        self.half_edges[he.0].prev
    }

    /// Face on the right of `he`.
    pub fn face_of(&self, he: HalfEdgeIx) -> FaceIx {
        self.half_edges[he.0].face
    }

    /// Face on the left of `he` (the face of its twin).
    pub fn left_face(&self, he: HalfEdgeIx) -> FaceIx {
        self.face_of(self.twin(he))
    }

    /// Boundary of `f` in traversal order, starting at the face's reference half-edge.
    pub fn face_cycle(&self, f: FaceIx) -> Vec<HalfEdgeIx> {
        let Some(start) = self.faces[f.0].half_edge else {
            return Vec::new();
        };
        let mut out: Vec<HalfEdgeIx> = vec![start];
        let mut he = self.next(start);
        while he != start && out.len() <= self.half_edges.len() {
            out.push(he);
            he = self.next(he);
        }
        out
    }

    /// Outgoing half-edges of `v` in counter-clockwise order.
    pub fn vertex_star(&self, v: VertexIx) -> Vec<HalfEdgeIx> {
        let Some(start) = self.vertices[v.0].half_edge else {
            return Vec::new();
        };
        let mut out: Vec<HalfEdgeIx> = vec![start];
        let mut he = self.next(self.twin(start));
        while he != start && out.len() <= self.half_edges.len() {
            out.push(he);
            he = self.next(self.twin(he));
        }
        out
    }

    pub fn degree(&self, v: VertexIx) -> usize {
        self.vertex_star(v).len()
    }

    pub fn half_edge_between(&self, u: VertexIx, v: VertexIx) -> Option<HalfEdgeIx> {
        self.vertex_star(u)
            .into_iter()
            .find(|&he| self.target(he) == v)
    }

    /// Marks `f` as the only external face.
    pub fn set_external(&mut self, f: FaceIx) {
        for (ix, face) in self.faces.iter_mut().enumerate() {
            face.external = ix == f.0;
        }
    }

    pub fn external_face(&self) -> Option<FaceIx> {
        self.faces.iter().position(|f| f.external).map(FaceIx)
    }

    /// `V - E + F`; 2 for every connected plane graph.
    pub fn euler_characteristic(&self) -> i64 {
        self.vertices.len() as i64 - self.edge_count() as i64 + self.faces.len() as i64
    }

    /// Faces in depth-first preorder of the dual graph, starting at `start`. Neighbors are taken
    /// in boundary order of the current face.
    pub fn dual_dfs(&self, start: FaceIx) -> Vec<FaceIx> {
        let mut order: Vec<FaceIx> = vec![start];
        let mut seen: FxHashSet<FaceIx> = FxHashSet::default();
        seen.insert(start);
        let mut stack: Vec<(Vec<HalfEdgeIx>, usize)> = vec![(self.face_cycle(start), 0)];
        while let Some((boundary, pos)) = stack.last_mut() {
            let Some(&he) = boundary.get(*pos) else {
                stack.pop();
                continue;
            };
            *pos += 1;
            let neighbor = self.left_face(he);
            if seen.insert(neighbor) {
                order.push(neighbor);
                stack.push((self.face_cycle(neighbor), 0));
            }
        }
        order
    }

    /// Half-edges of input edge `e_ix` from its first endpoint to its second, through any
    /// vertices inserted by [`Dcel::split_edge`].
    pub fn edge_chain(&self, e_ix: usize) -> Vec<HalfEdgeIx> {
        let Some(&first) = self.edge_half_edges.get(e_ix) else {
            return Vec::new();
        };
        let mut chain: Vec<HalfEdgeIx> = vec![first];
        let mut he = first;
        while chain.len() <= self.half_edges.len() {
            let v = self.target(he);
            if !self.vertices[v.0].key.is_bend() {
                break;
            }
            let back = self.twin(he);
            let Some(next) = self.vertex_star(v).into_iter().find(|&h| h != back) else {
                break;
            };
            chain.push(next);
            he = next;
        }
        chain
    }

    pub fn input_edge_count(&self) -> usize {
        self.edge_half_edges.len()
    }

    /// Inserts a vertex `m` in the middle of `he = u -> v`.
    ///
    /// `he` becomes `u -> m` and its twin becomes `v -> m`; the two new half-edges are appended.
    pub fn split_edge(&mut self, he: HalfEdgeIx, key: NodeKey) -> Split {
        let twin = self.twin(he);
        let right = self.face_of(he);
        let left = self.face_of(twin);
        let he_next = self.next(he);
        let twin_next = self.next(twin);

        let m = VertexIx(self.vertices.len());
        let forward = HalfEdgeIx(self.half_edges.len());
        let backward = HalfEdgeIx(self.half_edges.len() + 1);

        self.vertices.push(DcelVertex {
            key,
            half_edge: Some(forward),
        });
        self.half_edges.push(HalfEdge {
            origin: m,
            twin,
            next: he_next,
            prev: he,
            face: right,
        });
        self.half_edges.push(HalfEdge {
            origin: m,
            twin: he,
            next: twin_next,
            prev: twin,
            face: left,
        });

        self.half_edges[he.0].twin = backward;
        self.half_edges[he.0].next = forward;
        self.half_edges[twin.0].twin = forward;
        self.half_edges[twin.0].next = backward;
        self.half_edges[he_next.0].prev = forward;
        self.half_edges[twin_next.0].prev = backward;

        self.faces[right.0].len += 1;
        self.faces[left.0].len += 1;
        Split {
            vertex: m,
            forward,
            backward,
        }
    }
}
