//! Shape stage: bend-minimal orthogonal representation via Tamassia's flow network.
//!
//! Every vertex supplies 4 units (a full turn of 90° corners), every face consumes its angle sum
//! (`2|f| - 4` for inner faces, `2|f| + 4` for the external face). Vertex -> face arcs carry the
//! corner angles; face -> face arcs carry bends and cost 1 per unit, so the cheapest flow is the
//! shape with the fewest bends for the fixed embedding.

use crate::dcel::{Dcel, FaceIx, HalfEdgeIx, VertexIx};
use crate::error::{Error, Result};
use crate::options::{RefinementMethod, RefinementOptions};
use crate::planarization::Planarization;
use narwhal_flow::{
    CycleRefiner, ExactRefiner, FlowNetwork, FlowRefiner, FlowSolution, MinCostFlowSolver,
    SoftObjective, SuccessiveShortestPath, UNBOUNDED,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeNode {
    Vertex(VertexIx),
    Face(FaceIx),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeArc {
    /// Angle at the origin of the half-edge, inside its face.
    Corner(HalfEdgeIx),
    /// Bends along the half-edge, flowing from its left face into its right face.
    Bend(HalfEdgeIx),
}

/// Angles and bends of an orthogonal drawing, indexed by half-edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrthogonalRepresentation {
    /// Corner at the origin of each half-edge, in quarter turns (1 = 90°, ..., 4 = 360°).
    pub corners: Vec<u8>,
    /// Bends along each half-edge; each is a 90° corner in its left face and 270° in its face.
    pub bends: Vec<i64>,
    /// Total number of bends of the underlying flow.
    pub cost: i64,
}

impl OrthogonalRepresentation {
    pub fn corner(&self, he: HalfEdgeIx) -> u8 {
        self.corners[he.0]
    }

    pub fn bends_on(&self, he: HalfEdgeIx) -> i64 {
        self.bends[he.0]
    }

    pub fn total_bends(&self) -> i64 {
        self.bends.iter().sum()
    }
}

fn face_demand(dcel: &Dcel, f: FaceIx) -> i64 {
    let face = dcel.face(f);
    let len = face.len as i64;
    if face.external {
        2 * len + 4
    } else {
        2 * len - 4
    }
}

#[derive(Debug, Clone)]
pub struct Orthogonalization {
    planarization: Planarization,
    network: FlowNetwork<ShapeNode, ShapeArc>,
    solution: FlowSolution,
    shape: OrthogonalRepresentation,
    corner_edge: Vec<usize>,
    bend_edge: Vec<usize>,
}

impl Orthogonalization {
    pub fn new(planarization: Planarization) -> Result<Self> {
        Self::with_solver(planarization, &SuccessiveShortestPath)
    }

    pub fn with_solver<S: MinCostFlowSolver>(planarization: Planarization, solver: &S) -> Result<Self> {
        let dcel = planarization.dcel();
        let mut network: FlowNetwork<ShapeNode, ShapeArc> = FlowNetwork::new();
        let mut corner_edge: Vec<usize> = Vec::with_capacity(dcel.half_edge_count());
        let mut bend_edge: Vec<usize> = Vec::with_capacity(dcel.half_edge_count());

        if dcel.half_edge_count() > 0 {
            for v in dcel.vertex_ixs() {
                network.add_node(ShapeNode::Vertex(v), -4);
            }
            for f in dcel.face_ixs() {
                network.add_node(ShapeNode::Face(f), face_demand(dcel, f));
            }
            for he in dcel.half_edge_ixs() {
                let ix = network
                    .add_edge(
                        ShapeNode::Vertex(dcel.origin(he)),
                        ShapeNode::Face(dcel.face_of(he)),
                        ShapeArc::Corner(he),
                        1,
                        4,
                        0,
                    )
                    .map_err(Error::flow("orthogonalization"))?;
                corner_edge.push(ix);
            }
            for he in dcel.half_edge_ixs() {
                let ix = network
                    .add_edge(
                        ShapeNode::Face(dcel.left_face(he)),
                        ShapeNode::Face(dcel.face_of(he)),
                        ShapeArc::Bend(he),
                        0,
                        UNBOUNDED,
                        1,
                    )
                    .map_err(Error::flow("orthogonalization"))?;
                bend_edge.push(ix);
            }
        }

        let solution = if network.edge_count() == 0 {
            FlowSolution {
                flows: Vec::new(),
                cost: 0,
            }
        } else {
            solver
                .solve(&network)
                .map_err(Error::flow("orthogonalization"))?
        };

        let mut orth = Self {
            planarization,
            network,
            solution,
            shape: OrthogonalRepresentation::default(),
            corner_edge,
            bend_edge,
        };
        orth.apply_solution()?;
        debug!(
            nodes = orth.network.node_count(),
            arcs = orth.network.edge_count(),
            bends = orth.shape.cost,
            "orthogonalization"
        );
        Ok(orth)
    }

    fn apply_solution(&mut self) -> Result<()> {
        self.network
            .check_solution(&self.solution)
            .map_err(Error::flow("orthogonalization"))?;
        let corners: Vec<u8> = self
            .corner_edge
            .iter()
            .map(|&ix| u8::try_from(self.solution.flow(ix)))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::invariant("orthogonalization", e.to_string()))?;
        let bends: Vec<i64> = self
            .bend_edge
            .iter()
            .map(|&ix| self.solution.flow(ix))
            .collect();
        self.shape = OrthogonalRepresentation {
            cost: bends.iter().sum(),
            corners,
            bends,
        };
        Ok(())
    }

    /// Re-shapes the drawing against the soft objective described by `options`.
    pub fn refine(&mut self, options: &RefinementOptions) -> Result<()> {
        match options.method {
            RefinementMethod::Exact => self.refine_with(&ExactRefiner::default(), options),
            RefinementMethod::LocalSearch => {
                let refiner = CycleRefiner {
                    max_moves: options.max_moves,
                };
                self.refine_with(&refiner, options)
            }
        }
    }

    pub fn refine_with<R: FlowRefiner>(&mut self, refiner: &R, options: &RefinementOptions) -> Result<()> {
        let objective = self.soft_objective(options)?;
        if objective.is_empty() {
            return Ok(());
        }
        let before = objective.value(&self.solution.flows);
        let refined = refiner
            .refine(&self.network, &self.solution, &objective)
            .map_err(Error::flow("refinement"))?;
        debug!(
            terms = objective.terms().len(),
            before,
            after = objective.value(&refined.flows),
            bends = refined.cost,
            "refinement"
        );
        self.solution = refined;
        self.apply_solution()
    }

    /// Absolute-difference penalties over corner arcs.
    pub fn soft_objective(&self, options: &RefinementOptions) -> Result<SoftObjective> {
        let dcel = self.planarization.dcel();
        let graph = self.planarization.graph();
        let mut objective = SoftObjective::new();
        if self.corner_edge.is_empty() {
            return Ok(objective);
        }

        for v in dcel.vertex_ixs() {
            let star = dcel.vertex_star(v);
            match star.as_slice() {
                [a, b] => objective.push(
                    self.corner_edge[a.0],
                    self.corner_edge[b.0],
                    options.corner_weight,
                ),
                [_, _, _] => {
                    for (i, a) in star.iter().enumerate() {
                        for b in &star[i + 1..] {
                            if dcel.face_of(*a) == dcel.face_of(*b) {
                                objective.push(
                                    self.corner_edge[a.0],
                                    self.corner_edge[b.0],
                                    options.symmetry_weight,
                                );
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        for (a, b) in &options.symmetric_pairs {
            let lookup = |id: &String| {
                graph
                    .vertex_ix(id)
                    .map(VertexIx)
                    .ok_or_else(|| Error::UnknownVertex { vertex: id.clone() })
            };
            let (u, v) = (lookup(a)?, lookup(b)?);
            for f in dcel.face_ixs() {
                let cycle = dcel.face_cycle(f);
                let at_u = cycle.iter().find(|&&he| dcel.origin(he) == u);
                let at_v = cycle.iter().find(|&&he| dcel.origin(he) == v);
                if let (Some(hu), Some(hv)) = (at_u, at_v) {
                    objective.push(
                        self.corner_edge[hu.0],
                        self.corner_edge[hv.0],
                        options.symmetry_weight,
                    );
                }
            }
        }
        Ok(objective)
    }

    /// Number of 90° corners at degree-2 vertices plus the bend cost.
    pub fn corner_cost(&self) -> i64 {
        let dcel = self.planarization.dcel();
        let mut sharp: i64 = 0;
        for v in dcel.vertex_ixs() {
            let star = dcel.vertex_star(v);
            if star.len() == 2 {
                sharp += star.iter().filter(|&&he| self.shape.corner(he) == 1).count() as i64;
            }
        }
        sharp + self.shape.cost
    }

    pub fn planarization(&self) -> &Planarization {
        &self.planarization
    }

    pub fn network(&self) -> &FlowNetwork<ShapeNode, ShapeArc> {
        &self.network
    }

    pub fn solution(&self) -> &FlowSolution {
        &self.solution
    }

    pub fn shape(&self) -> &OrthogonalRepresentation {
        &self.shape
    }
}
