//! Metrics stage: segment lengths and integer coordinates.
//!
//! Lengths come from two flow problems, one per axis. For the vertical one, every North
//! half-edge carries flow from the face on its left to the face on its right; a face's inflow
//! (its West boundary) then equals its outflow (its East boundary), which is exactly the
//! condition for the face boundary to close. Each segment has length at least 1 and costs 1 per
//! unit, so the solve returns the shortest total edge length. The external face is split into a
//! source and a sink joined by a free bypass arc.

use crate::bends::{self, ExpandedShape};
use crate::dcel::{Dcel, FaceIx, HalfEdgeIx, VertexIx};
use crate::error::{Error, Result};
use crate::model::{Coord, EdgeRoute, LayoutResult, LayoutStats, NodeKey};
use crate::options::LayoutOptions;
use crate::orthogonalization::Orthogonalization;
use crate::sides::{self, EdgeSides, Side};
use narwhal_flow::{FlowNetwork, MinCostFlowSolver, SuccessiveShortestPath, UNBOUNDED};
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompactionNode {
    Face(FaceIx),
    /// Second copy of the external face, absorbing the flow the external face emits.
    Sink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompactionArc {
    Segment(HalfEdgeIx),
    Bypass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Lengths of North/South segments.
    Vertical,
    /// Lengths of East/West segments.
    Horizontal,
}

impl Axis {
    fn side(self) -> Side {
        match self {
            Axis::Vertical => Side::North,
            Axis::Horizontal => Side::East,
        }
    }
}

/// Flow network whose solution gives the lengths of the segments along `axis`.
pub fn axis_network(
    dcel: &Dcel,
    sides: &EdgeSides,
    external: FaceIx,
    axis: Axis,
) -> Result<FlowNetwork<CompactionNode, CompactionArc>> {
    let mut network: FlowNetwork<CompactionNode, CompactionArc> = FlowNetwork::new();
    network.add_node(CompactionNode::Face(external), -UNBOUNDED);
    network.add_node(CompactionNode::Sink, UNBOUNDED);
    for f in dcel.face_ixs() {
        if f != external {
            network.add_node(CompactionNode::Face(f), 0);
        }
    }
    network
        .add_edge(
            CompactionNode::Face(external),
            CompactionNode::Sink,
            CompactionArc::Bypass,
            0,
            UNBOUNDED,
            0,
        )
        .map_err(Error::flow("compaction"))?;

    let wanted = axis.side();
    for he in dcel.half_edge_ixs() {
        if sides.get(he) != wanted {
            continue;
        }
        let right = dcel.face_of(he);
        let target = if right == external {
            CompactionNode::Sink
        } else {
            CompactionNode::Face(right)
        };
        network
            .add_edge(
                CompactionNode::Face(dcel.left_face(he)),
                target,
                CompactionArc::Segment(he),
                1,
                UNBOUNDED,
                1,
            )
            .map_err(Error::flow("compaction"))?;
    }
    Ok(network)
}

#[derive(Debug, Clone)]
pub struct Compaction {
    dcel: Dcel,
    external: FaceIx,
    face_order: Vec<FaceIx>,
    corners: Vec<u8>,
    sides: EdgeSides,
    lengths: Vec<i64>,
    bend_count: usize,
    unit: i64,
}

impl Compaction {
    pub fn new(orth: &Orthogonalization, options: &LayoutOptions) -> Result<Self> {
        Self::with_solver(orth, options, &SuccessiveShortestPath)
    }

    pub fn with_solver<S: MinCostFlowSolver>(
        orth: &Orthogonalization,
        options: &LayoutOptions,
        solver: &S,
    ) -> Result<Self> {
        let planarization = orth.planarization();
        let external = planarization.external_face();
        let ExpandedShape {
            dcel,
            corners,
            bend_count,
        } = bends::expand_bends(planarization.working_copy(), orth.shape())?;

        let anchor = match planarization.positions() {
            Some(pos) if options.preserve_orientation => dcel
                .face_cycle(external)
                .into_iter()
                .find(|&he| {
                    !dcel.vertex(dcel.origin(he)).key.is_bend()
                        && !dcel.vertex(dcel.target(he)).key.is_bend()
                })
                .map(|he| {
                    let (u, v) = (dcel.origin(he).0, dcel.target(he).0);
                    (he, Side::from_direction(pos[v].x - pos[u].x, pos[v].y - pos[u].y))
                }),
            _ => None,
        };
        let sides = sides::assign_sides(&dcel, &corners, external, anchor)?;

        let mut lengths: Vec<i64> = vec![0; dcel.half_edge_count()];
        for axis in [Axis::Vertical, Axis::Horizontal] {
            let network = axis_network(&dcel, &sides, external, axis)?;
            let solution = solver.solve(&network).map_err(Error::flow("compaction"))?;
            network
                .check_solution(&solution)
                .map_err(Error::flow("compaction"))?;
            for (ix, edge) in network.edges().iter().enumerate() {
                if let CompactionArc::Segment(he) = edge.key {
                    let len = solution.flow(ix);
                    lengths[he.0] = len;
                    lengths[dcel.twin(he).0] = len;
                }
            }
            trace!(
                ?axis,
                segments = network.edge_count() - 1,
                cost = solution.cost,
                "compaction axis solved"
            );
        }
        if let Some(he) = dcel.half_edge_ixs().find(|he| lengths[he.0] < 1) {
            return Err(Error::invariant(
                "compaction",
                format!("half-edge {} has no length", he.0),
            ));
        }

        let face_order = dcel.dual_dfs(external);
        debug!(
            bends = bend_count,
            total_length = lengths.iter().sum::<i64>() / 2,
            "compaction"
        );
        Ok(Self {
            dcel,
            external,
            face_order,
            corners,
            sides,
            lengths,
            bend_count,
            unit: options.unit,
        })
    }

    /// Bend-free face structure the coordinates refer to.
    pub fn dcel(&self) -> &Dcel {
        &self.dcel
    }

    pub fn external_face(&self) -> FaceIx {
        self.external
    }

    pub fn corners(&self) -> &[u8] {
        &self.corners
    }

    pub fn sides(&self) -> &EdgeSides {
        &self.sides
    }

    pub fn length(&self, he: HalfEdgeIx) -> i64 {
        self.lengths[he.0]
    }

    pub fn bend_count(&self) -> usize {
        self.bend_count
    }

    /// Grid coordinates of every DCEL vertex, translated so the minimum x and y are 0 and
    /// multiplied by the configured unit.
    pub fn coordinates(&self) -> Result<Vec<Coord>> {
        let dcel = &self.dcel;
        let mut placed: Vec<Option<(i64, i64)>> = vec![None; dcel.vertex_count()];
        let start = self
            .face_order
            .first()
            .and_then(|&f| dcel.face_cycle(f).first().map(|&he| dcel.origin(he)))
            .unwrap_or(VertexIx(0));
        if let Some(slot) = placed.get_mut(start.0) {
            *slot = Some((0, 0));
        }

        for &f in &self.face_order {
            let cycle = dcel.face_cycle(f);
            for _ in 0..2 {
                for &he in &cycle {
                    let (u, v) = (dcel.origin(he), dcel.target(he));
                    if let (Some((x, y)), None) = (placed[u.0], placed[v.0]) {
                        let (dx, dy) = self.sides.get(he).step();
                        let len = self.lengths[he.0];
                        placed[v.0] = Some((x + dx * len, y + dy * len));
                    }
                }
            }
        }

        let mut coords: Vec<(i64, i64)> = Vec::with_capacity(placed.len());
        for (v, p) in placed.into_iter().enumerate() {
            let Some(p) = p else {
                return Err(Error::invariant(
                    "compaction",
                    format!("{} was never placed", dcel.vertex(VertexIx(v)).key),
                ));
            };
            coords.push(p);
        }

        for he in dcel.half_edge_ixs() {
            let (u, v) = (coords[dcel.origin(he).0], coords[dcel.target(he).0]);
            let (dx, dy) = self.sides.get(he).step();
            let len = self.lengths[he.0];
            if (v.0 - u.0, v.1 - u.1) != (dx * len, dy * len) {
                return Err(Error::invariant(
                    "compaction",
                    format!("half-edge {} does not match its side and length", he.0),
                ));
            }
        }

        let min_x = coords.iter().map(|c| c.0).min().unwrap_or(0);
        let min_y = coords.iter().map(|c| c.1).min().unwrap_or(0);
        Ok(coords
            .into_iter()
            .map(|(x, y)| Coord::new((x - min_x) * self.unit, (y - min_y) * self.unit))
            .collect())
    }

    /// Final positions, edge routes and statistics.
    pub fn layout(&self) -> Result<LayoutResult> {
        let dcel = &self.dcel;
        let coords = self.coordinates()?;

        let positions: BTreeMap<NodeKey, Coord> = dcel
            .vertex_ixs()
            .map(|v| (dcel.vertex(v).key.clone(), coords[v.0]))
            .collect();

        let mut routes: Vec<EdgeRoute> = Vec::with_capacity(dcel.input_edge_count());
        for e_ix in 0..dcel.input_edge_count() {
            let chain = dcel.edge_chain(e_ix);
            let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
                continue;
            };
            let mut points: Vec<Coord> = vec![coords[dcel.origin(first).0]];
            points.extend(chain.iter().map(|&he| coords[dcel.target(he).0]));
            let route = EdgeRoute {
                source: dcel.vertex(dcel.origin(first)).key.to_string(),
                target: dcel.vertex(dcel.target(last)).key.to_string(),
                points,
            };
            check_orthogonal(&route)?;
            routes.push(route);
        }

        let mut occupied: BTreeMap<Coord, &NodeKey> = BTreeMap::new();
        let mut overlaps: usize = 0;
        for (key, &c) in &positions {
            if let Some(first) = occupied.insert(c, key) {
                overlaps += 1;
                debug!(%first, second = %key, x = c.x, y = c.y, "vertices share a grid point");
            }
        }

        let stats = LayoutStats {
            bends: self.bend_count,
            faces: dcel.face_count(),
            total_edge_length: routes.iter().map(EdgeRoute::length).sum(),
            width: coords.iter().map(|c| c.x).max().unwrap_or(0),
            height: coords.iter().map(|c| c.y).max().unwrap_or(0),
            overlaps,
        };
        Ok(LayoutResult {
            positions,
            routes,
            stats,
        })
    }
}

/// Consecutive points of a route must differ along exactly one axis.
fn check_orthogonal(route: &EdgeRoute) -> Result<()> {
    for pair in route.points.windows(2) {
        let moves_x = pair[0].x != pair[1].x;
        let moves_y = pair[0].y != pair[1].y;
        if moves_x == moves_y {
            return Err(Error::invariant(
                "compaction",
                format!(
                    "segment {:?} -> {:?} of {} -- {} is not axis-parallel",
                    pair[0], pair[1], route.source, route.target
                ),
            ));
        }
    }
    Ok(())
}
