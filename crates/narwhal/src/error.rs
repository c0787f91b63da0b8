use narwhal_flow::FlowError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graph is not planar")]
    NotPlanar,

    #[error("graph is disconnected ({components} components)")]
    Disconnected { components: usize },

    #[error("vertex {vertex} has degree {degree}, orthogonal layout supports at most 4")]
    DegreeExceeded { vertex: String, degree: usize },

    #[error("internal invariant violated during {stage}: {detail}")]
    InternalInvariant { stage: &'static str, detail: String },

    #[error("duplicate vertex id: {vertex}")]
    DuplicateVertex { vertex: String },

    #[error("edge {from} -- {to} references a missing vertex")]
    MissingEndpoint { from: String, to: String },

    #[error("self-loop on vertex {vertex}")]
    SelfLoop { vertex: String },

    #[error("duplicate edge {from} -- {to}")]
    DuplicateEdge { from: String, to: String },

    #[error("unknown vertex: {vertex}")]
    UnknownVertex { vertex: String },

    #[error("no position supplied for vertex {vertex}")]
    MissingPosition { vertex: String },

    #[error("position of vertex {vertex} is not finite")]
    NonFinitePosition { vertex: String },

    #[error("adjacent vertices {from} and {to} share the same position")]
    CoincidentPositions { from: String, to: String },

    #[error("supplied positions make edges {first:?} and {second:?} cross")]
    CrossingEdges {
        first: (String, String),
        second: (String, String),
    },

    #[error("invalid layout options: {message}")]
    InvalidOptions { message: String },
}

impl Error {
    pub(crate) fn invariant(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::InternalInvariant {
            stage,
            detail: detail.into(),
        }
    }

    /// Flow failures are never caused by user input once the graph has been validated.
    pub(crate) fn flow(stage: &'static str) -> impl FnOnce(FlowError) -> Self {
        move |err| Self::invariant(stage, err.to_string())
    }
}
