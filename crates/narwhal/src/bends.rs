//! Replaces bends with degree-2 dummy vertices so that every edge of the DCEL is straight.

use crate::dcel::{Dcel, HalfEdgeIx};
use crate::error::{Error, Result};
use crate::model::NodeKey;
use crate::orthogonalization::OrthogonalRepresentation;

/// A DCEL without bends, with the corner of every (old and new) half-edge.
#[derive(Debug, Clone)]
pub struct ExpandedShape {
    pub dcel: Dcel,
    pub corners: Vec<u8>,
    pub bend_count: usize,
}

/// Splits every bent edge into a chain of straight segments.
///
/// Bends of edge `i` are inserted walking from the endpoint whose half-edge carries the net bend
/// flow; bend ids are assigned in that order, edge by edge.
pub fn expand_bends(mut dcel: Dcel, shape: &OrthogonalRepresentation) -> Result<ExpandedShape> {
    if shape.corners.len() != dcel.half_edge_count() {
        return Err(Error::invariant(
            "bend expansion",
            "shape does not match the face structure",
        ));
    }
    let mut corners = shape.corners.clone();
    let mut bend_count: usize = 0;

    for e_ix in 0..dcel.input_edge_count() {
        let (h, t) = (HalfEdgeIx(2 * e_ix), HalfEdgeIx(2 * e_ix + 1));
        let net = shape.bends_on(h) - shape.bends_on(t);
        let (mut seg, count) = if net >= 0 { (h, net) } else { (t, -net) };
        for _ in 0..count {
            let split = dcel.split_edge(seg, NodeKey::Bend(bend_count));
            bend_count += 1;
            if split.forward.0 != corners.len() || split.backward.0 != corners.len() + 1 {
                return Err(Error::invariant("bend expansion", "unexpected half-edge index"));
            }
            // Convex towards the left face, reflex towards the right one.
            corners.push(3);
            corners.push(1);
            seg = split.forward;
        }
    }

    check_angle_sums(&dcel, &corners)?;
    Ok(ExpandedShape {
        dcel,
        corners,
        bend_count,
    })
}

fn check_angle_sums(dcel: &Dcel, corners: &[u8]) -> Result<()> {
    for v in dcel.vertex_ixs() {
        let star = dcel.vertex_star(v);
        if star.is_empty() {
            continue;
        }
        let sum: u32 = star.iter().map(|he| u32::from(corners[he.0])).sum();
        if sum != 4 {
            return Err(Error::invariant(
                "bend expansion",
                format!("angles around {} sum to {sum}", dcel.vertex(v).key),
            ));
        }
    }
    for f in dcel.face_ixs() {
        let face = dcel.face(f);
        if face.len == 0 {
            continue;
        }
        let sum: i64 = dcel
            .face_cycle(f)
            .iter()
            .map(|he| i64::from(corners[he.0]))
            .sum();
        let expected = if face.external {
            2 * face.len as i64 + 4
        } else {
            2 * face.len as i64 - 4
        };
        if sum != expected {
            return Err(Error::invariant(
                "bend expansion",
                format!("angles of face {} sum to {sum}, expected {expected}", f.0),
            ));
        }
    }
    Ok(())
}
