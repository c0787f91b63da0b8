#![forbid(unsafe_code)]

//! Capacitated min-cost-flow networks used by `narwhal`.
//!
//! The orthogonal layout pipeline solves three flow problems per layout request (one for the
//! shape, two for compaction). All of them share the same model: a directed multigraph whose
//! nodes carry a signed demand and whose edges carry a lower bound, a capacity and a unit cost.
//!
//! The solver and the soft-objective refinement are reached through narrow traits
//! ([`MinCostFlowSolver`], [`FlowRefiner`]) so a different backend can be plugged in without
//! touching the graph-modeling code.

pub mod error;
pub mod network;
pub mod refine;
pub mod ssp;

pub use error::{FlowError, Result};
pub use network::{FlowEdge, FlowNetwork, FlowSolution, UNBOUNDED};
pub use refine::{AbsDiffTerm, CycleRefiner, ExactRefiner, FlowRefiner, SoftObjective};
pub use ssp::SuccessiveShortestPath;

use std::fmt::Debug;
use std::hash::Hash;

/// A min-cost-flow backend.
///
/// Implementations must return a flow that satisfies every lower bound, capacity and node
/// demand, with minimum total `weight * flow`. A network whose demands cannot be met yields
/// [`FlowError::Infeasible`].
pub trait MinCostFlowSolver {
    fn solve<N, K>(&self, network: &FlowNetwork<N, K>) -> Result<FlowSolution>
    where
        N: Clone + Eq + Hash + Debug,
        K: Clone + Eq + Hash + Debug;
}
