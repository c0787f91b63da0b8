//! Input graph model and validation.

use crate::error::{Error, Result};
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Orthogonal layout supports at most four edges around a vertex (one per compass side).
pub const MAX_DEGREE: usize = 4;

/// Undirected simple graph supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Adds a vertex unless one with the same id already exists.
    pub fn add_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if !self.nodes.contains(&id) {
            self.nodes.push(id);
        }
        self
    }

    /// Adds an edge, creating missing endpoints.
    pub fn add_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        let v = v.into();
        let w = w.into();
        self.add_node(v.clone());
        self.add_node(w.clone());
        self.edges.push((v, w));
        self
    }

    /// Adds the edges `ids[0]-ids[1]`, `ids[1]-ids[2]`, ...
    pub fn set_path(&mut self, ids: &[&str]) -> &mut Self {
        for pair in ids.windows(2) {
            self.add_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn from_edges(edges: &[(&str, &str)]) -> Self {
        let mut g = Self::new();
        for (v, w) in edges {
            g.add_edge(*v, *w);
        }
        g
    }

    /// Validates the graph and builds the index-based view used by the layout stages.
    ///
    /// Checks run in a fixed order: duplicate ids, dangling edges, self-loops, duplicate edges,
    /// vertex degree, connectivity.
    pub fn validate(&self) -> Result<IndexedGraph> {
        let mut index: HashMap<String, usize> = HashMap::default();
        for (ix, id) in self.nodes.iter().enumerate() {
            if index.insert(id.clone(), ix).is_some() {
                return Err(Error::DuplicateVertex { vertex: id.clone() });
            }
        }

        let mut edges: Vec<(usize, usize)> = Vec::with_capacity(self.edges.len());
        let mut seen: HashSet<(usize, usize)> = HashSet::default();
        for (v, w) in &self.edges {
            let (Some(&v_ix), Some(&w_ix)) = (index.get(v), index.get(w)) else {
                return Err(Error::MissingEndpoint {
                    from: v.clone(),
                    to: w.clone(),
                });
            };
            if v_ix == w_ix {
                return Err(Error::SelfLoop { vertex: v.clone() });
            }
            if !seen.insert((v_ix.min(w_ix), v_ix.max(w_ix))) {
                return Err(Error::DuplicateEdge {
                    from: v.clone(),
                    to: w.clone(),
                });
            }
            edges.push((v_ix, w_ix));
        }

        let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.nodes.len()];
        for (e_ix, &(v_ix, w_ix)) in edges.iter().enumerate() {
            adj[v_ix].push((w_ix, e_ix));
            adj[w_ix].push((v_ix, e_ix));
        }

        if let Some((v_ix, nbrs)) = adj.iter().enumerate().find(|(_, n)| n.len() > MAX_DEGREE) {
            return Err(Error::DegreeExceeded {
                vertex: self.nodes[v_ix].clone(),
                degree: nbrs.len(),
            });
        }

        let graph = IndexedGraph {
            ids: self.nodes.clone(),
            index,
            edges,
            adj,
        };
        let components = graph.component_count();
        if components > 1 {
            return Err(Error::Disconnected { components });
        }
        Ok(graph)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Caller-supplied initial positions, keyed by vertex id.
pub type Positions = BTreeMap<String, Point>;

/// Validated graph with dense vertex indices (insertion order) and edge indices.
#[derive(Debug, Clone)]
pub struct IndexedGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    /// Per vertex: `(neighbor, edge index)` in edge order.
    adj: Vec<Vec<(usize, usize)>>,
}

impl IndexedGraph {
    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn id(&self, v_ix: usize) -> &str {
        &self.ids[v_ix]
    }

    pub fn vertex_ix(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn edge(&self, e_ix: usize) -> (usize, usize) {
        self.edges[e_ix]
    }

    pub fn neighbors(&self, v_ix: usize) -> impl Iterator<Item = usize> + '_ {
        self.adj[v_ix].iter().map(|&(w, _)| w)
    }

    pub fn incident(&self, v_ix: usize) -> &[(usize, usize)] {
        &self.adj[v_ix]
    }

    pub fn degree(&self, v_ix: usize) -> usize {
        self.adj[v_ix].len()
    }

    pub fn component_count(&self) -> usize {
        let mut seen: Vec<bool> = vec![false; self.ids.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut components: usize = 0;
        for root in 0..self.ids.len() {
            if seen[root] {
                continue;
            }
            components += 1;
            seen[root] = true;
            stack.push(root);
            while let Some(v) = stack.pop() {
                for w in self.neighbors(v) {
                    if !seen[w] {
                        seen[w] = true;
                        stack.push(w);
                    }
                }
            }
        }
        components
    }
}
