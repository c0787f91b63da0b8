//! Layout configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// When positions are supplied, rotate the drawing so the outer boundary keeps the direction
    /// it had in the input.
    pub preserve_orientation: bool,
    /// Grid unit applied to the final coordinates.
    pub unit: i64,
    /// Optional soft-objective refinement of the bend-minimal shape.
    pub refinement: Option<RefinementOptions>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            preserve_orientation: true,
            unit: 1,
            refinement: None,
        }
    }
}

impl LayoutOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json).map_err(|e| Error::InvalidOptions {
            message: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.unit < 1 {
            return Err(Error::InvalidOptions {
                message: format!("unit must be at least 1, got {}", self.unit),
            });
        }
        if let Some(refinement) = &self.refinement {
            if refinement.corner_weight < 0 || refinement.symmetry_weight < 0 {
                return Err(Error::InvalidOptions {
                    message: "refinement weights must be non-negative".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Weights of the soft objective terms layered on top of bend minimization.
///
/// There is no single right default: bend-minimal shapes are rarely unique and the preferred
/// one is a matter of taste. With both weights at zero the refinement is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefinementOptions {
    /// Penalty per unit of difference between the two corners of a degree-2 vertex.
    pub corner_weight: i64,
    /// Penalty per unit of asymmetry between `symmetric_pairs` and between the two corners a
    /// degree-3 vertex has in the same face.
    pub symmetry_weight: i64,
    pub symmetric_pairs: Vec<(String, String)>,
    pub method: RefinementMethod,
    /// Upper bound on accepted moves of the local search.
    pub max_moves: usize,
}

impl Default for RefinementOptions {
    fn default() -> Self {
        Self {
            corner_weight: 0,
            symmetry_weight: 0,
            symmetric_pairs: Vec::new(),
            method: RefinementMethod::Exact,
            max_moves: 256,
        }
    }
}

/// How the soft objective is optimized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefinementMethod {
    /// Branch and bound; finds the best shape.
    #[default]
    Exact,
    /// Unit moves around residual cycles; faster, may stop at a local optimum.
    LocalSearch,
}
