//! Sampling colours along a path through HSV space.
//!
//! Each channel runs from a start to an end value; an exponent bends the
//! path (1 is a straight line, 2 a parabola, 0.5 a square root). Samples sit
//! at cell centres `t_i = (i + 0.5) / n`, which keeps every sample inside its
//! own slice `[t_i - 0.5/n, t_i + 0.5/n)` of the path and never lands two
//! samples on the wrap point of a full circle.

use super::hsv::{CssColor, Hsv};
use crate::error::{HierarchyError, Result};
use serde::{Deserialize, Serialize};

fn default_exponent() -> f64 {
    1.0
}

/// Start/end values for one channel plus the curvature between them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelPath {
    pub start: f64,
    pub end: f64,
    #[serde(default = "default_exponent")]
    pub exponent: f64,
}

impl ChannelPath {
    pub const fn new(start: f64, end: f64, exponent: f64) -> Self {
        Self {
            start,
            end,
            exponent,
        }
    }

    pub const fn linear(start: f64, end: f64) -> Self {
        Self::new(start, end, 1.0)
    }

    pub const fn constant(value: f64) -> Self {
        Self::new(value, value, 1.0)
    }

    /// Channel value at path parameter `t` in `[0, 1]`
    pub fn at(&self, t: f64) -> f64 {
        self.start + (self.end - self.start) * t.clamp(0.0, 1.0).powf(self.exponent)
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    fn validate(&self, name: &str, unit_range: bool) -> Result<()> {
        if !(self.start.is_finite() && self.end.is_finite()) {
            return Err(HierarchyError::invalid_config(format!(
                "{name}: start/end must be finite"
            )));
        }
        if !(self.exponent.is_finite() && self.exponent > 0.0) {
            return Err(HierarchyError::invalid_config(format!(
                "{name}: exponent must be > 0, got {}",
                self.exponent
            )));
        }
        if unit_range
            && !((0.0..=1.0).contains(&self.start) && (0.0..=1.0).contains(&self.end))
        {
            return Err(HierarchyError::invalid_config(format!(
                "{name}: start/end must lie in [0, 1], got {}..{}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Unwrapped hue interval; `start` may be negative or `end` exceed 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueWindow {
    pub start: f64,
    pub end: f64,
}

impl HueWindow {
    pub const FULL_CIRCLE: HueWindow = HueWindow {
        start: 0.0,
        end: 1.0,
    };

    pub fn centred(centre: f64, width: f64) -> Self {
        Self {
            start: centre - width / 2.0,
            end: centre + width / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn centre(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Containment on the unwrapped axis, with a little slack for rounding
    pub fn contains_window(&self, inner: &HueWindow) -> bool {
        const EPS: f64 = 1e-12;
        inner.start >= self.start - EPS && inner.end <= self.end + EPS
    }

    pub fn overlaps(&self, other: &HueWindow) -> bool {
        const EPS: f64 = 1e-12;
        self.start < other.end - EPS && other.start < self.end - EPS
    }
}

/// One sample: the colour plus the slice of hue it owns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueSample {
    /// Hue before wrapping, on the same axis as `window`
    pub hue: f64,
    pub hsv: Hsv,
    pub window: HueWindow,
}

/// How sampled colours are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryFormat {
    Hsv,
    Rgb,
    #[default]
    Css,
}

/// A sampled colour in the requested format
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrajectoryPoint {
    Hsv(Hsv),
    Rgb([f64; 3]),
    Css(CssColor),
}

/// A path through HSV space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueTrajectory {
    pub hue: ChannelPath,
    pub saturation: ChannelPath,
    pub value: ChannelPath,
}

impl HueTrajectory {
    pub const fn new(hue: ChannelPath, saturation: ChannelPath, value: ChannelPath) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Once around the hue circle starting at `offset`
    pub const fn full_circle(offset: f64, saturation: ChannelPath, value: ChannelPath) -> Self {
        Self::new(ChannelPath::linear(offset, offset + 1.0), saturation, value)
    }

    /// Spread across `window`, hue bent by `hue_exponent`
    pub fn across(
        window: HueWindow,
        hue_exponent: f64,
        saturation: ChannelPath,
        value: ChannelPath,
    ) -> Self {
        Self::new(
            ChannelPath::new(window.start, window.end, hue_exponent),
            saturation,
            value,
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.hue.validate("hue", false)?;
        self.saturation.validate("saturation", true)?;
        self.value.validate("value", true)?;
        if self.hue.span().abs() > 1.0 + 1e-12 {
            return Err(HierarchyError::invalid_config(format!(
                "hue path spans {} turns; at most one full circle is allowed",
                self.hue.span().abs()
            )));
        }
        Ok(())
    }

    /// Path parameter of the `i`-th of `n` samples
    pub fn cell_centre(i: usize, n: usize) -> f64 {
        (i as f64 + 0.5) / n as f64
    }

    fn hsv_at(&self, t: f64) -> Hsv {
        Hsv::new(self.hue.at(t), self.saturation.at(t), self.value.at(t))
    }

    /// `n` colours along the path, in path order
    pub fn sample(&self, n: usize) -> Vec<Hsv> {
        (0..n).map(|i| self.hsv_at(Self::cell_centre(i, n))).collect()
    }

    /// `n` colours with the hue slice each one owns. Slices are ordered,
    /// disjoint and together cover the hue path.
    pub fn sample_windows(&self, n: usize) -> Vec<HueSample> {
        (0..n)
            .map(|i| {
                let lo = i as f64 / n as f64;
                let hi = (i + 1) as f64 / n as f64;
                let t = Self::cell_centre(i, n);
                HueSample {
                    hue: self.hue.at(t),
                    hsv: self.hsv_at(t),
                    window: HueWindow {
                        start: self.hue.at(lo),
                        end: self.hue.at(hi),
                    },
                }
            })
            .collect()
    }

    pub fn sample_as(&self, n: usize, format: TrajectoryFormat) -> Vec<TrajectoryPoint> {
        self.sample(n)
            .into_iter()
            .map(|hsv| match format {
                TrajectoryFormat::Hsv => TrajectoryPoint::Hsv(hsv),
                TrajectoryFormat::Rgb => {
                    let (r, g, b) = hsv.to_rgb();
                    TrajectoryPoint::Rgb([r, g, b])
                }
                TrajectoryFormat::Css => TrajectoryPoint::Css(hsv.to_css()),
            })
            .collect()
    }
}
