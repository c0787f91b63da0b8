//! Soft-objective refinement of an optimal flow.
//!
//! Some callers want to trade a little linear cost for a "nicer" flow, expressed as penalties on
//! the absolute difference between pairs of edge flows. That is an integer program rather than a
//! flow problem, so it is handled as a separate step on top of a solved flow.
//!
//! [`ExactRefiner`] solves it exactly by branch and bound over the penalized edges: every search
//! node pins a prefix of them and solves the remaining min-cost flow, which bounds the objective
//! from below and is itself a feasible candidate. [`CycleRefiner`] is a cheaper local search that
//! moves single units of flow around residual cycles and keeps a move only when it strictly
//! lowers `cost + soft penalties`; it can stop at a local optimum.
//!
//! Both return the input solution unchanged when nothing strictly better exists.

use crate::MinCostFlowSolver;
use crate::error::{FlowError, Result};
use crate::network::{FlowNetwork, FlowSolution};
use crate::ssp::SuccessiveShortestPath;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

/// Penalty `weight * |flow[a] - flow[b]|` on two edges of the same network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsDiffTerm {
    pub a: usize,
    pub b: usize,
    pub weight: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SoftObjective {
    terms: Vec<AbsDiffTerm>,
}

impl SoftObjective {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a penalty term. Terms with a zero weight or a single edge are dropped.
    pub fn push(&mut self, a: usize, b: usize, weight: i64) {
        if weight == 0 || a == b {
            return;
        }
        self.terms.push(AbsDiffTerm { a, b, weight });
    }

    pub fn terms(&self) -> &[AbsDiffTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn value(&self, flows: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|t| {
                let fa = flows.get(t.a).copied().unwrap_or(0);
                let fb = flows.get(t.b).copied().unwrap_or(0);
                t.weight * (fa - fb).abs()
            })
            .sum()
    }
}

/// Improves a solved flow against a soft objective without breaking feasibility.
pub trait FlowRefiner {
    fn refine<N, K>(
        &self,
        network: &FlowNetwork<N, K>,
        solution: &FlowSolution,
        objective: &SoftObjective,
    ) -> Result<FlowSolution>
    where
        N: Clone + Eq + Hash + Debug,
        K: Clone + Eq + Hash + Debug;
}

#[derive(Debug, Clone, Copy)]
pub struct CycleRefiner {
    /// Upper bound on accepted moves.
    pub max_moves: usize,
}

impl Default for CycleRefiner {
    fn default() -> Self {
        Self { max_moves: 256 }
    }
}

/// One unit of residual capacity: pushing along it changes `flows[edge]` by `delta`.
#[derive(Debug, Clone, Copy)]
struct Move {
    from: usize,
    to: usize,
    edge: usize,
    delta: i64,
}

fn residual_moves<N, K>(network: &FlowNetwork<N, K>, flows: &[i64]) -> Vec<Move>
where
    N: Clone + Eq + Hash + Debug,
    K: Clone + Eq + Hash + Debug,
{
    let mut moves: Vec<Move> = Vec::new();
    for (ix, e) in network.edges().iter().enumerate() {
        let (Some(s_ix), Some(t_ix)) = (network.node_ix(&e.source), network.node_ix(&e.target))
        else {
            continue;
        };
        if flows[ix] < e.capacity {
            moves.push(Move {
                from: s_ix,
                to: t_ix,
                edge: ix,
                delta: 1,
            });
        }
        if flows[ix] > e.lower {
            moves.push(Move {
                from: t_ix,
                to: s_ix,
                edge: ix,
                delta: -1,
            });
        }
    }
    moves
}

/// Fewest-arc residual path from `from` to `to` that does not touch edge `skip_edge`.
fn closing_path(
    moves: &[Move],
    out: &[Vec<usize>],
    from: usize,
    to: usize,
    skip_edge: usize,
) -> Option<Vec<usize>> {
    if from == to {
        return Some(Vec::new());
    }
    let mut prev: Vec<Option<usize>> = vec![None; out.len()];
    let mut seen: Vec<bool> = vec![false; out.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    seen[from] = true;
    queue.push_back(from);
    while let Some(u) = queue.pop_front() {
        for &m_ix in &out[u] {
            let m = moves[m_ix];
            if m.edge == skip_edge || seen[m.to] {
                continue;
            }
            seen[m.to] = true;
            prev[m.to] = Some(m_ix);
            if m.to == to {
                let mut path: Vec<usize> = Vec::new();
                let mut v = to;
                while v != from {
                    let m_ix = prev[v]?;
                    path.push(m_ix);
                    v = moves[m_ix].from;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(m.to);
        }
    }
    None
}

impl FlowRefiner for CycleRefiner {
    fn refine<N, K>(
        &self,
        network: &FlowNetwork<N, K>,
        solution: &FlowSolution,
        objective: &SoftObjective,
    ) -> Result<FlowSolution>
    where
        N: Clone + Eq + Hash + Debug,
        K: Clone + Eq + Hash + Debug,
    {
        if objective.is_empty() {
            return Ok(solution.clone());
        }

        let mut flows = solution.flows.clone();
        let mut current = network.cost_of(&flows) + objective.value(&flows);
        let mut accepted: usize = 0;

        'search: while accepted < self.max_moves {
            let moves = residual_moves(network, &flows);
            let mut out: Vec<Vec<usize>> = vec![Vec::new(); network.node_count()];
            for (m_ix, m) in moves.iter().enumerate() {
                out[m.from].push(m_ix);
            }

            for seed in &moves {
                let Some(path) = closing_path(&moves, &out, seed.to, seed.from, seed.edge) else {
                    continue;
                };
                let mut candidate = flows.clone();
                candidate[seed.edge] += seed.delta;
                for &m_ix in &path {
                    let m = moves[m_ix];
                    candidate[m.edge] += m.delta;
                }
                let value = network.cost_of(&candidate) + objective.value(&candidate);
                if value < current {
                    tracing::trace!(from = current, to = value, cycle = path.len() + 1, "refined flow");
                    flows = candidate;
                    current = value;
                    accepted += 1;
                    continue 'search;
                }
            }
            break;
        }

        let cost = network.cost_of(&flows);
        tracing::debug!(
            moves = accepted,
            cost,
            objective = current,
            "soft-objective refinement finished"
        );
        Ok(FlowSolution { flows, cost })
    }
}

/// Exact minimizer of `cost + soft penalties`.
///
/// Penalty weights must be non-negative and every penalized edge must have a flow range of at
/// most `max_span` units. The search is exponential in the number of penalized edges in the worst
/// case; the min-cost-flow bound keeps it small on shape networks.
#[derive(Debug, Clone, Copy)]
pub struct ExactRefiner {
    pub max_span: i64,
}

impl Default for ExactRefiner {
    fn default() -> Self {
        Self { max_span: 16 }
    }
}

impl ExactRefiner {
    /// Penalized edges in first-use order.
    fn branch_edges<N, K>(
        &self,
        network: &FlowNetwork<N, K>,
        objective: &SoftObjective,
    ) -> Result<Vec<usize>>
    where
        N: Clone + Eq + Hash + Debug,
        K: Clone + Eq + Hash + Debug,
    {
        let mut vars: Vec<usize> = Vec::new();
        for t in objective.terms() {
            if t.weight < 0 {
                return Err(FlowError::InvalidObjective {
                    detail: format!(
                        "term on edges {} and {} has negative weight {}",
                        t.a, t.b, t.weight
                    ),
                });
            }
            for e in [t.a, t.b] {
                if vars.contains(&e) {
                    continue;
                }
                let Some(edge) = network.edges().get(e) else {
                    return Err(FlowError::UnknownEdge { edge: e });
                };
                if edge.capacity - edge.lower > self.max_span {
                    return Err(FlowError::InvalidObjective {
                        detail: format!(
                            "edge {e} spans [{}, {}], wider than {}",
                            edge.lower, edge.capacity, self.max_span
                        ),
                    });
                }
                vars.push(e);
            }
        }
        Ok(vars)
    }
}

impl FlowRefiner for ExactRefiner {
    fn refine<N, K>(
        &self,
        network: &FlowNetwork<N, K>,
        solution: &FlowSolution,
        objective: &SoftObjective,
    ) -> Result<FlowSolution>
    where
        N: Clone + Eq + Hash + Debug,
        K: Clone + Eq + Hash + Debug,
    {
        if objective.is_empty() {
            return Ok(solution.clone());
        }
        let vars = self.branch_edges(network, objective)?;
        let mut depth_of: Vec<usize> = vec![usize::MAX; network.edge_count()];
        for (depth, &e) in vars.iter().enumerate() {
            depth_of[e] = depth;
        }

        let mut best_flows = solution.flows.clone();
        let mut best = network.cost_of(&best_flows) + objective.value(&best_flows);
        let start = best;
        let mut explored: usize = 0;

        // Each entry pins `vars[..pinned.len()]` to the listed flows.
        let mut stack: Vec<Vec<i64>> = vec![Vec::new()];
        while let Some(pinned) = stack.pop() {
            explored += 1;
            let mut restricted = network.clone();
            for (&e, &value) in vars.iter().zip(&pinned) {
                restricted.pin_flow(e, value)?;
            }
            let relaxed = match SuccessiveShortestPath.solve(&restricted) {
                Ok(sol) => sol,
                Err(FlowError::Infeasible { .. }) => continue,
                Err(err) => return Err(err),
            };

            // Terms with both edges pinned are exact, the rest contribute at least 0.
            let pinned_penalty: i64 = objective
                .terms()
                .iter()
                .filter(|t| depth_of[t.a] < pinned.len() && depth_of[t.b] < pinned.len())
                .map(|t| t.weight * (relaxed.flow(t.a) - relaxed.flow(t.b)).abs())
                .sum();
            if relaxed.cost + pinned_penalty >= best {
                continue;
            }
            let value = relaxed.cost + objective.value(&relaxed.flows);
            if value < best {
                tracing::trace!(from = best, to = value, pinned = pinned.len(), "refined flow");
                best = value;
                best_flows = relaxed.flows.clone();
            }

            let Some(&e) = vars.get(pinned.len()) else {
                continue;
            };
            let edge = &network.edges()[e];
            let guess = relaxed.flow(e);
            let mut values: Vec<i64> = (edge.lower..=edge.capacity).collect();
            values.sort_by_key(|&v| ((v - guess).abs(), v));
            // Closest to the relaxed flow is explored first.
            for &v in values.iter().rev() {
                let mut child = pinned.clone();
                child.push(v);
                stack.push(child);
            }
        }

        let cost = network.cost_of(&best_flows);
        tracing::debug!(
            explored,
            branch_edges = vars.len(),
            before = start,
            objective = best,
            cost,
            "exact refinement finished"
        );
        Ok(FlowSolution {
            flows: best_flows,
            cost,
        })
    }
}
