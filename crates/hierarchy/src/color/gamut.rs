//! How much of its hue window a node hands to its children.
//!
//! The fraction depends only on the node's number of children: few children
//! stay close to the parent hue (`min`), the largest family in the catalogue
//! gets `max`. `exponent` shapes the curve in between: above 1 small
//! families stay tight for longer, below 1 they open up early.

use crate::error::{HierarchyError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamutCurve {
    pub min: f64,
    pub max: f64,
    pub exponent: f64,
}

impl Default for GamutCurve {
    fn default() -> Self {
        Self {
            min: 0.35,
            max: 0.9,
            exponent: 1.0,
        }
    }
}

impl GamutCurve {
    pub fn validate(&self) -> Result<()> {
        if !(self.min > 0.0 && self.min < 1.0 && self.max > 0.0 && self.max < 1.0) {
            return Err(HierarchyError::invalid_config(format!(
                "gamut bounds must lie strictly inside (0, 1), got {}..{}",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(HierarchyError::invalid_config(format!(
                "gamut min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if !(self.exponent.is_finite() && self.exponent > 0.0) {
            return Err(HierarchyError::invalid_config(format!(
                "gamut exponent must be > 0, got {}",
                self.exponent
            )));
        }
        Ok(())
    }

    /// Fraction for a node with `children` children when the largest family
    /// has `max_children`
    pub fn fraction(&self, children: usize, max_children: usize) -> f64 {
        if children <= 1 || max_children <= 1 {
            return self.min;
        }
        if children >= max_children {
            return self.max;
        }
        let t = (children - 1) as f64 / (max_children - 1) as f64;
        self.min + (self.max - self.min) * t.powf(self.exponent)
    }

    /// Precompute fractions for every family size up to `max_children`
    pub fn tabulate(&self, max_children: usize) -> GamutTable {
        let widths = (0..=max_children.max(1))
            .map(|n| self.fraction(n, max_children))
            .collect();
        GamutTable { widths }
    }
}

/// Gamut fraction per number of children
#[derive(Debug, Clone, PartialEq)]
pub struct GamutTable {
    widths: Vec<f64>,
}

impl GamutTable {
    pub fn width_for(&self, children: usize) -> f64 {
        let idx = children.min(self.widths.len() - 1);
        self.widths[idx]
    }

    pub fn max_children(&self) -> usize {
        self.widths.len() - 1
    }
}
