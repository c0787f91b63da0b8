//! Layout output types.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A node of the final drawing: either a caller vertex or a synthesized bend point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Vertex(String),
    /// Bend points are numbered in creation order, starting at 0.
    Bend(usize),
}

impl NodeKey {
    pub fn vertex(id: impl Into<String>) -> Self {
        Self::Vertex(id.into())
    }

    pub fn is_bend(&self) -> bool {
        matches!(self, Self::Bend(_))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex(id) => f.write_str(id),
            Self::Bend(n) => write!(f, "bend:{n}"),
        }
    }
}

// Serialized as a plain string so that it can key JSON objects.
impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Integer grid coordinate; x grows East, y grows North.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Polyline of one caller edge, from its first endpoint through its bend points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRoute {
    pub source: String,
    pub target: String,
    pub points: Vec<Coord>,
}

impl EdgeRoute {
    pub fn bends(&self) -> usize {
        self.points.len().saturating_sub(2)
    }

    /// Sum of the segment lengths (each segment is axis-parallel).
    pub fn length(&self) -> i64 {
        self.points
            .windows(2)
            .map(|w| (w[1].x - w[0].x).abs() + (w[1].y - w[0].y).abs())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayoutStats {
    pub bends: usize,
    pub faces: usize,
    pub total_edge_length: i64,
    pub width: i64,
    pub height: i64,
    /// Vertices and bends placed on a grid point that is already taken. Faces with reflex
    /// corners are not rectangularized, so this can be non-zero.
    pub overlaps: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutResult {
    pub positions: BTreeMap<NodeKey, Coord>,
    pub routes: Vec<EdgeRoute>,
    pub stats: LayoutStats,
}

impl LayoutResult {
    pub fn position(&self, id: &str) -> Option<Coord> {
        self.positions.get(&NodeKey::vertex(id)).copied()
    }

    pub fn bend_points(&self) -> impl Iterator<Item = (&NodeKey, &Coord)> + '_ {
        self.positions.iter().filter(|(k, _)| k.is_bend())
    }
}
