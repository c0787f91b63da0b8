pub type Result<T> = std::result::Result<T, FlowError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("flow network has no node {node}")]
    UnknownNode { node: String },

    #[error("duplicate flow edge {from} -> {to} keyed {key}")]
    DuplicateEdge {
        from: String,
        to: String,
        key: String,
    },

    #[error("flow edge {edge} has invalid bounds [{lower}, {capacity}]")]
    InvalidBounds {
        edge: String,
        lower: i64,
        capacity: i64,
    },

    #[error("flow network has no edge {edge}")]
    UnknownEdge { edge: usize },

    #[error("soft objective cannot be optimized: {detail}")]
    InvalidObjective { detail: String },

    #[error("node demands do not balance: supply {supply}, demand {demand}")]
    Unbalanced { supply: i64, demand: i64 },

    #[error("no feasible flow exists: {unmet} units of demand cannot be routed")]
    Infeasible { unmet: i64 },

    #[error("residual network contains a negative-cost cycle")]
    NegativeCycle,

    #[error("flow on edge {edge} is {flow}, outside [{lower}, {capacity}]")]
    BoundsViolated {
        edge: String,
        flow: i64,
        lower: i64,
        capacity: i64,
    },

    #[error("node {node} has net inflow {actual}, expected {expected}")]
    ConservationViolated {
        node: String,
        expected: i64,
        actual: i64,
    },
}
