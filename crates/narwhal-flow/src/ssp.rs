//! Successive shortest path min-cost-flow solver.
//!
//! Lower bounds are removed up front (each edge is pre-loaded with its lower bound and node
//! demands are adjusted accordingly), then a super source / super sink pair is attached and flow
//! is augmented along cheapest residual paths until every supply is routed.
//!
//! Shortest paths use a queue-based Bellman-Ford, so negative edge weights are accepted as long
//! as the network has no negative-cost cycle.

use crate::MinCostFlowSolver;
use crate::error::{FlowError, Result};
use crate::network::{FlowNetwork, FlowSolution};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessiveShortestPath;

#[derive(Debug, Clone, Copy)]
struct Arc {
    to: usize,
    cap: i64,
    cost: i64,
    /// Index of the reverse arc in `Residual::arcs`.
    rev: usize,
}

#[derive(Debug, Clone)]
struct Residual {
    arcs: Vec<Arc>,
    out: Vec<Vec<usize>>,
}

impl Residual {
    fn new(node_count: usize) -> Self {
        Self {
            arcs: Vec::new(),
            out: vec![Vec::new(); node_count],
        }
    }

    fn add_arc(&mut self, from: usize, to: usize, cap: i64, cost: i64) -> usize {
        let fwd = self.arcs.len();
        let bwd = fwd + 1;
        self.arcs.push(Arc {
            to,
            cap,
            cost,
            rev: bwd,
        });
        self.arcs.push(Arc {
            to: from,
            cap: 0,
            cost: -cost,
            rev: fwd,
        });
        self.out[from].push(fwd);
        self.out[to].push(bwd);
        fwd
    }

    /// Cheapest path from `s` to `t` over arcs with residual capacity, as a list of arc indices.
    fn shortest_path(&self, s: usize, t: usize) -> Result<Option<Vec<usize>>> {
        let n = self.out.len();
        let mut dist: Vec<i64> = vec![i64::MAX; n];
        let mut prev_arc: Vec<Option<usize>> = vec![None; n];
        let mut in_queue: Vec<bool> = vec![false; n];
        // Without a negative cycle no node is queued n times.
        let mut enqueued: Vec<usize> = vec![0; n];
        let mut queue: VecDeque<usize> = VecDeque::new();

        dist[s] = 0;
        queue.push_back(s);
        in_queue[s] = true;
        enqueued[s] = 1;

        while let Some(u) = queue.pop_front() {
            in_queue[u] = false;
            let du = dist[u];
            for &a_ix in &self.out[u] {
                let arc = self.arcs[a_ix];
                if arc.cap <= 0 {
                    continue;
                }
                let candidate = du + arc.cost;
                if candidate < dist[arc.to] {
                    dist[arc.to] = candidate;
                    prev_arc[arc.to] = Some(a_ix);
                    if !in_queue[arc.to] {
                        enqueued[arc.to] += 1;
                        if enqueued[arc.to] >= n {
                            return Err(FlowError::NegativeCycle);
                        }
                        in_queue[arc.to] = true;
                        queue.push_back(arc.to);
                    }
                }
            }
        }

        if dist[t] == i64::MAX {
            return Ok(None);
        }

        let mut path: Vec<usize> = Vec::new();
        let mut v = t;
        while v != s {
            let Some(a_ix) = prev_arc[v] else {
                return Ok(None);
            };
            path.push(a_ix);
            v = self.arcs[self.arcs[a_ix].rev].to;
        }
        path.reverse();
        Ok(Some(path))
    }
}

impl MinCostFlowSolver for SuccessiveShortestPath {
    fn solve<N, K>(&self, network: &FlowNetwork<N, K>) -> Result<FlowSolution>
    where
        N: Clone + Eq + Hash + Debug,
        K: Clone + Eq + Hash + Debug,
    {
        let node_count = network.node_count();
        let super_source = node_count;
        let super_sink = node_count + 1;
        let mut residual = Residual::new(node_count + 2);

        let mut adjusted: Vec<i64> = network.nodes().map(|(_, d)| d).collect();
        let mut supply: i64 = 0;
        let mut demand: i64 = 0;
        for &d in &adjusted {
            if d < 0 {
                supply -= d;
            } else {
                demand += d;
            }
        }
        if supply != demand {
            return Err(FlowError::Unbalanced { supply, demand });
        }

        let mut edge_arcs: Vec<usize> = Vec::with_capacity(network.edge_count());
        for e in network.edges() {
            let (Some(s_ix), Some(t_ix)) = (network.node_ix(&e.source), network.node_ix(&e.target))
            else {
                return Err(FlowError::UnknownNode {
                    node: format!("{:?}", e.source),
                });
            };
            // Pre-load the lower bound: the target already received it, the source already sent it.
            adjusted[t_ix] -= e.lower;
            adjusted[s_ix] += e.lower;
            edge_arcs.push(residual.add_arc(s_ix, t_ix, e.capacity - e.lower, e.weight));
        }

        let mut required: i64 = 0;
        for (n_ix, &d) in adjusted.iter().enumerate() {
            if d < 0 {
                residual.add_arc(super_source, n_ix, -d, 0);
            } else if d > 0 {
                residual.add_arc(n_ix, super_sink, d, 0);
                required += d;
            }
        }

        let mut routed: i64 = 0;
        let mut augmentations: usize = 0;
        while routed < required {
            let Some(path) = residual.shortest_path(super_source, super_sink)? else {
                break;
            };
            let bottleneck = path
                .iter()
                .map(|&a_ix| residual.arcs[a_ix].cap)
                .min()
                .unwrap_or(0)
                .min(required - routed);
            if bottleneck <= 0 {
                break;
            }
            for &a_ix in &path {
                let rev = residual.arcs[a_ix].rev;
                residual.arcs[a_ix].cap -= bottleneck;
                residual.arcs[rev].cap += bottleneck;
            }
            routed += bottleneck;
            augmentations += 1;
            tracing::trace!(
                augmentation = augmentations,
                units = bottleneck,
                arcs = path.len(),
                "augmented flow"
            );
        }

        if routed < required {
            return Err(FlowError::Infeasible {
                unmet: required - routed,
            });
        }

        let flows: Vec<i64> = network
            .edges()
            .iter()
            .zip(&edge_arcs)
            .map(|(e, &a_ix)| {
                // Flow pushed through an arc shows up as capacity on its reverse arc.
                e.lower + residual.arcs[residual.arcs[a_ix].rev].cap
            })
            .collect();
        let cost = network.cost_of(&flows);
        tracing::debug!(
            nodes = node_count,
            edges = network.edge_count(),
            augmentations,
            cost,
            "min-cost flow solved"
        );
        Ok(FlowSolution { flows, cost })
    }
}
