//! Mapping from layout grid coordinates to pixel coordinates.
//!
//! The drawing area is cut into one cell per grid column and row; each node lands in the middle
//! of its cell. Screen y grows downwards, so rows are flipped.

use crate::error::{Error, Result};
use crate::model::{Coord, NodeKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ScreenPoint {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    margin: f64,
    cell_width: f64,
    cell_height: f64,
    max_y: i64,
}

impl ScreenMapping {
    /// Fits the bounding box of `positions` into `size`, leaving `margin` pixels on every side.
    pub fn new(size: ScreenSize, positions: &BTreeMap<NodeKey, Coord>, margin: u32) -> Result<Self> {
        let usable_w = i64::from(size.width) - 2 * i64::from(margin);
        let usable_h = i64::from(size.height) - 2 * i64::from(margin);
        if usable_w <= 0 || usable_h <= 0 {
            return Err(Error::InvalidOptions {
                message: format!(
                    "screen {}x{} leaves no room inside a {margin}px margin",
                    size.width, size.height
                ),
            });
        }
        let max_x = positions.values().map(|c| c.x).max().unwrap_or(0).max(0);
        let max_y = positions.values().map(|c| c.y).max().unwrap_or(0).max(0);
        Ok(Self {
            margin: f64::from(margin),
            cell_width: usable_w as f64 / (max_x + 1) as f64,
            cell_height: usable_h as f64 / (max_y + 1) as f64,
            max_y,
        })
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    pub fn to_screen(&self, c: Coord) -> ScreenPoint {
        let x = self.margin + (c.x as f64 + 0.5) * self.cell_width;
        let y = self.margin + ((self.max_y - c.y) as f64 + 0.5) * self.cell_height;
        ScreenPoint {
            x: x.round() as i64,
            y: y.round() as i64,
        }
    }

    pub fn map_all(&self, positions: &BTreeMap<NodeKey, Coord>) -> BTreeMap<NodeKey, ScreenPoint> {
        positions
            .iter()
            .map(|(k, &c)| (k.clone(), self.to_screen(c)))
            .collect()
    }
}
