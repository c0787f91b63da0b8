//! Flow network model.
//!
//! Edges are identified by a `(source, target, key)` triple so that parallel edges between the
//! same pair of nodes stay distinguishable (the orthogonalization network routinely has several
//! edges between two faces, one per shared half-edge).

use crate::error::{FlowError, Result};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::fmt::Debug;
use std::hash::Hash;

/// Capacity used for "unbounded" edges and for the artificial supply of the compaction source.
pub const UNBOUNDED: i64 = 1 << 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge<N, K> {
    pub source: N,
    pub target: N,
    pub key: K,
    pub lower: i64,
    pub capacity: i64,
    pub weight: i64,
}

/// Result of a flow solve. `flows[i]` is the flow on `network.edges()[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSolution {
    pub flows: Vec<i64>,
    pub cost: i64,
}

impl FlowSolution {
    pub fn flow(&self, edge_ix: usize) -> i64 {
        self.flows.get(edge_ix).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct FlowNetwork<N, K> {
    /// Node -> demand (`inflow - outflow` required at the node).
    nodes: IndexMap<N, i64, FxBuildHasher>,
    edges: Vec<FlowEdge<N, K>>,
    edge_index: FxHashMap<(N, N, K), usize>,
}

impl<N, K> Default for FlowNetwork<N, K>
where
    N: Clone + Eq + Hash + Debug,
    K: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, K> FlowNetwork<N, K>
where
    N: Clone + Eq + Hash + Debug,
    K: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::default(),
            edges: Vec::new(),
            edge_index: FxHashMap::default(),
        }
    }

    /// Adds `node` with the given demand, or overwrites the demand of an existing node.
    pub fn add_node(&mut self, node: N, demand: i64) {
        self.nodes.insert(node, demand);
    }

    pub fn set_demand(&mut self, node: &N, demand: i64) -> Result<()> {
        let Some(slot) = self.nodes.get_mut(node) else {
            return Err(FlowError::UnknownNode {
                node: format!("{node:?}"),
            });
        };
        *slot = demand;
        Ok(())
    }

    pub fn demand(&self, node: &N) -> Option<i64> {
        self.nodes.get(node).copied()
    }

    pub fn has_node(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node_ix(&self, node: &N) -> Option<usize> {
        self.nodes.get_index_of(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes with their demands, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&N, i64)> + '_ {
        self.nodes.iter().map(|(n, d)| (n, *d))
    }

    pub fn edges(&self) -> &[FlowEdge<N, K>] {
        &self.edges
    }

    /// Adds an edge and returns its index. Missing endpoints are added with demand 0.
    pub fn add_edge(
        &mut self,
        source: N,
        target: N,
        key: K,
        lower: i64,
        capacity: i64,
        weight: i64,
    ) -> Result<usize> {
        if lower < 0 || capacity < lower {
            return Err(FlowError::InvalidBounds {
                edge: format!("{source:?} -> {target:?} ({key:?})"),
                lower,
                capacity,
            });
        }
        let triple = (source.clone(), target.clone(), key.clone());
        if self.edge_index.contains_key(&triple) {
            return Err(FlowError::DuplicateEdge {
                from: format!("{source:?}"),
                to: format!("{target:?}"),
                key: format!("{key:?}"),
            });
        }
        if !self.nodes.contains_key(&source) {
            self.nodes.insert(source.clone(), 0);
        }
        if !self.nodes.contains_key(&target) {
            self.nodes.insert(target.clone(), 0);
        }

        let ix = self.edges.len();
        self.edges.push(FlowEdge {
            source,
            target,
            key,
            lower,
            capacity,
            weight,
        });
        self.edge_index.insert(triple, ix);
        Ok(ix)
    }

    /// Narrows the bounds of edge `edge_ix` to exactly `value`.
    pub fn pin_flow(&mut self, edge_ix: usize, value: i64) -> Result<()> {
        let Some(e) = self.edges.get_mut(edge_ix) else {
            return Err(FlowError::UnknownEdge { edge: edge_ix });
        };
        if value < e.lower || value > e.capacity {
            return Err(FlowError::InvalidBounds {
                edge: format!("{:?} -> {:?} ({:?})", e.source, e.target, e.key),
                lower: value,
                capacity: value,
            });
        }
        e.lower = value;
        e.capacity = value;
        Ok(())
    }

    pub fn edge_ix(&self, source: &N, target: &N, key: &K) -> Option<usize> {
        self.edge_index
            .get(&(source.clone(), target.clone(), key.clone()))
            .copied()
    }

    /// Flow on the edge `(source, target, key)` in `solution`, if the edge exists.
    pub fn flow_of(&self, solution: &FlowSolution, source: &N, target: &N, key: &K) -> Option<i64> {
        self.edge_ix(source, target, key)
            .map(|ix| solution.flow(ix))
    }

    pub fn cost_of(&self, flows: &[i64]) -> i64 {
        self.edges
            .iter()
            .zip(flows)
            .map(|(e, f)| e.weight * f)
            .sum()
    }

    /// `inflow - outflow` at `node` under `flows`.
    pub fn net_inflow(&self, node: &N, flows: &[i64]) -> i64 {
        let mut net: i64 = 0;
        for (e, f) in self.edges.iter().zip(flows) {
            if e.source == e.target {
                continue;
            }
            if &e.target == node {
                net += f;
            }
            if &e.source == node {
                net -= f;
            }
        }
        net
    }

    /// Checks every edge bound and every node demand against `solution`.
    pub fn check_solution(&self, solution: &FlowSolution) -> Result<()> {
        for (ix, e) in self.edges.iter().enumerate() {
            let flow = solution.flow(ix);
            if flow < e.lower || flow > e.capacity {
                return Err(FlowError::BoundsViolated {
                    edge: format!("{:?} -> {:?} ({:?})", e.source, e.target, e.key),
                    flow,
                    lower: e.lower,
                    capacity: e.capacity,
                });
            }
        }

        let mut net: Vec<i64> = vec![0; self.nodes.len()];
        for (ix, e) in self.edges.iter().enumerate() {
            let (Some(s_ix), Some(t_ix)) = (self.node_ix(&e.source), self.node_ix(&e.target))
            else {
                continue;
            };
            let flow = solution.flow(ix);
            net[t_ix] += flow;
            net[s_ix] -= flow;
        }
        for (n_ix, (node, demand)) in self.nodes.iter().enumerate() {
            if net[n_ix] != *demand {
                return Err(FlowError::ConservationViolated {
                    node: format!("{node:?}"),
                    expected: *demand,
                    actual: net[n_ix],
                });
            }
        }
        Ok(())
    }
}
