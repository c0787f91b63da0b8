//! Compass direction of every half-edge of a bend-free orthogonal shape.

use crate::dcel::{Dcel, FaceIx, HalfEdgeIx};
use crate::error::{Error, Result};
use serde::Serialize;

/// Direction of travel along a half-edge. Turning right is `+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    pub fn index(self) -> usize {
        match self {
            Side::North => 0,
            Side::East => 1,
            Side::South => 2,
            Side::West => 3,
        }
    }

    pub fn from_index(ix: usize) -> Self {
        Self::ALL[ix % 4]
    }

    pub fn opposite(self) -> Self {
        self.rotate(2)
    }

    /// Rotates clockwise by `quarter_turns`.
    pub fn rotate(self, quarter_turns: usize) -> Self {
        Self::from_index(self.index() + quarter_turns)
    }

    /// Unit grid step; y grows North.
    pub fn step(self) -> (i64, i64) {
        match self {
            Side::North => (0, 1),
            Side::East => (1, 0),
            Side::South => (0, -1),
            Side::West => (-1, 0),
        }
    }

    /// The side closest to the direction `(dx, dy)`; horizontal wins ties.
    pub fn from_direction(dx: f64, dy: f64) -> Self {
        if dx.abs() >= dy.abs() {
            if dx >= 0.0 { Side::East } else { Side::West }
        } else if dy > 0.0 {
            Side::North
        } else {
            Side::South
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Side::North | Side::South)
    }
}

/// Quarter turns (clockwise) taken when entering a corner of the given value.
fn turn(corner: u8) -> usize {
    match corner {
        1 => 1,
        3 => 3,
        4 => 2,
        _ => 0,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSides {
    sides: Vec<Side>,
}

impl EdgeSides {
    pub fn get(&self, he: HalfEdgeIx) -> Side {
        self.sides[he.0]
    }

    pub fn as_slice(&self) -> &[Side] {
        &self.sides
    }

    pub fn len(&self) -> usize {
        self.sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }
}

/// Labels every half-edge with its side.
///
/// Faces are labeled in dual DFS order from `external`. Within a face the side follows the
/// corners; a face then takes the rotation that makes its first half-edge with an already
/// labeled twin point the opposite way. `anchor` fixes the side of one half-edge of the external
/// face.
pub fn assign_sides(
    dcel: &Dcel,
    corners: &[u8],
    external: FaceIx,
    anchor: Option<(HalfEdgeIx, Side)>,
) -> Result<EdgeSides> {
    let mut labels: Vec<Option<usize>> = vec![None; dcel.half_edge_count()];
    if labels.is_empty() {
        return Ok(EdgeSides::default());
    }

    for (pos, f) in dcel.dual_dfs(external).into_iter().enumerate() {
        let cycle = dcel.face_cycle(f);
        let mut local: Vec<usize> = Vec::with_capacity(cycle.len());
        let mut side: usize = 0;
        for (k, he) in cycle.iter().enumerate() {
            if k > 0 {
                side = (side + turn(corners[he.0])) % 4;
            }
            local.push(side);
        }
        if let Some(first) = cycle.first() {
            if (side + turn(corners[first.0])) % 4 != 0 {
                return Err(Error::invariant(
                    "side assignment",
                    format!("boundary of face {} does not close", f.0),
                ));
            }
        }

        let offset = if pos == 0 {
            anchor
                .and_then(|(he, want)| {
                    cycle
                        .iter()
                        .position(|&h| h == he)
                        .map(|k| (want.index() + 4 - local[k]) % 4)
                })
                .unwrap_or(0)
        } else {
            let Some((k, twin_side)) = cycle
                .iter()
                .enumerate()
                .find_map(|(k, &he)| labels[dcel.twin(he).0].map(|s| (k, s)))
            else {
                return Err(Error::invariant(
                    "side assignment",
                    format!("face {} has no labeled neighbor", f.0),
                ));
            };
            (twin_side + 2 + 4 - local[k]) % 4
        };

        for (he, l) in cycle.iter().zip(&local) {
            labels[he.0] = Some((l + offset) % 4);
        }
    }

    let mut sides: Vec<Side> = Vec::with_capacity(labels.len());
    for he in dcel.half_edge_ixs() {
        let (Some(s), Some(t)) = (labels[he.0], labels[dcel.twin(he).0]) else {
            return Err(Error::invariant(
                "side assignment",
                format!("half-edge {} is unlabeled", he.0),
            ));
        };
        if (s + 2) % 4 != t {
            return Err(Error::invariant(
                "side assignment",
                format!("half-edge {} and its twin are not opposite", he.0),
            ));
        }
        sides.push(Side::from_index(s));
    }
    Ok(EdgeSides { sides })
}
