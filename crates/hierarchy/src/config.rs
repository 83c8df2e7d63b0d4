//! Pipeline configuration.
//!
//! Everything has a default, so an empty file (or no file) is a valid
//! configuration. Files may be JSON or TOML; JSON is tried first.

use crate::builder::InferenceStrategy;
use crate::color::gamut::GamutCurve;
use crate::color::hsv::wrap_hue;
use crate::color::trajectory::{ChannelPath, HueTrajectory, HueWindow};
use crate::error::{HierarchyError, Result};
use crate::key::KeyFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ROOT_LABEL: &str = "Straftaten";

/// Hue bend plus saturation and value paths for one family of siblings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPaths {
    pub hue_exponent: f64,
    pub saturation: ChannelPath,
    pub value: ChannelPath,
}

impl Default for ChannelPaths {
    fn default() -> Self {
        Self {
            hue_exponent: 1.0,
            saturation: ChannelPath::linear(0.70, 0.45),
            value: ChannelPath::linear(0.85, 0.65),
        }
    }
}

impl ChannelPaths {
    /// Trajectory spreading these channels across `window`
    pub fn across(&self, window: HueWindow) -> HueTrajectory {
        HueTrajectory::across(window, self.hue_exponent, self.saturation, self.value)
    }

    fn validate(&self, name: &str) -> Result<()> {
        self.across(HueWindow::FULL_CIRCLE)
            .validate()
            .map_err(|err| match err {
                HierarchyError::InvalidConfig(msg) => {
                    HierarchyError::invalid_config(format!("colors.{name}.{msg}"))
                }
                other => other,
            })
    }
}

/// Tuning for the recursive colour assignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Where on the circle the first top-level category starts, in turns
    pub hue_offset: f64,

    /// Paths for the categories directly under the root
    pub top: ChannelPaths,

    /// Paths for every deeper family
    pub children: ChannelPaths,

    /// How much of its own window a parent hands to its children
    pub gamut: GamutCurve,

    /// Added to the value path per level below 2; deeper levels get lighter
    /// when positive
    pub level_value_shift: f64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            hue_offset: 0.0,
            top: ChannelPaths {
                hue_exponent: 1.0,
                saturation: ChannelPath::linear(0.85, 0.65),
                value: ChannelPath::linear(0.80, 0.70),
            },
            children: ChannelPaths::default(),
            gamut: GamutCurve::default(),
            level_value_shift: 0.05,
        }
    }
}

impl ColorConfig {
    /// Saturated palette for dark backgrounds
    pub fn vivid() -> Self {
        Self {
            top: ChannelPaths {
                hue_exponent: 1.0,
                saturation: ChannelPath::linear(1.0, 0.85),
                value: ChannelPath::linear(0.95, 0.85),
            },
            children: ChannelPaths {
                hue_exponent: 1.0,
                saturation: ChannelPath::linear(0.85, 0.60),
                value: ChannelPath::linear(0.95, 0.80),
            },
            gamut: GamutCurve {
                min: 0.45,
                max: 0.95,
                exponent: 1.0,
            },
            level_value_shift: 0.0,
            ..Self::default()
        }
    }

    /// Pastel palette for print
    pub fn muted() -> Self {
        Self {
            top: ChannelPaths {
                hue_exponent: 1.0,
                saturation: ChannelPath::linear(0.50, 0.40),
                value: ChannelPath::linear(0.85, 0.80),
            },
            children: ChannelPaths {
                hue_exponent: 1.0,
                saturation: ChannelPath::linear(0.40, 0.25),
                value: ChannelPath::linear(0.90, 0.80),
            },
            gamut: GamutCurve {
                min: 0.30,
                max: 0.80,
                exponent: 0.5,
            },
            level_value_shift: 0.03,
            ..Self::default()
        }
    }

    /// Once around the circle from `hue_offset`, for the top-level categories.
    /// The offset is folded onto `[0, 1)` first so large values keep their
    /// precision.
    pub fn top_trajectory(&self) -> HueTrajectory {
        let start = wrap_hue(self.hue_offset);
        self.top.across(HueWindow {
            start,
            end: start + 1.0,
        })
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "vivid" => Some(Self::vivid()),
            "muted" => Some(Self::muted()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.hue_offset.is_finite() {
            return Err(HierarchyError::invalid_config(
                "colors.hue_offset must be finite",
            ));
        }
        if !(self.level_value_shift.is_finite() && self.level_value_shift.abs() <= 1.0) {
            return Err(HierarchyError::invalid_config(format!(
                "colors.level_value_shift must lie in [-1, 1], got {}",
                self.level_value_shift
            )));
        }
        self.top.validate("top")?;
        self.children.validate("children")?;
        self.gamut.validate()
    }
}

/// Everything the pipeline needs besides the keys themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub strategy: InferenceStrategy,

    /// Display name of the synthetic root
    pub root_label: String,

    pub colors: ColorConfig,

    /// Applied when keys are read from unsorted sources
    pub filter: KeyFilter,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: InferenceStrategy::default(),
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            colors: ColorConfig::default(),
            filter: KeyFilter::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.root_label.trim().is_empty() {
            return Err(HierarchyError::invalid_config("root_label must not be empty"));
        }
        self.colors.validate()
    }

    /// Parse and validate a JSON or TOML document
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self = match serde_json::from_slice(bytes) {
            Ok(config) => config,
            Err(json_err) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|err| HierarchyError::Parse(format!("{json_err}; {err}")))?;
                toml::from_str(text).map_err(|toml_err| {
                    HierarchyError::Parse(format!(
                        "config is not valid JSON ({json_err}) or TOML ({toml_err})"
                    ))
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes).map_err(|err| match err {
            HierarchyError::Parse(msg) => {
                HierarchyError::Parse(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hsv::hue_distance;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_and_presets_validate() {
        PipelineConfig::default().validate().unwrap();
        for name in ["default", "vivid", "muted"] {
            ColorConfig::preset(name).unwrap().validate().unwrap();
        }
        assert!(ColorConfig::preset("neon").is_none());
    }

    #[test]
    fn large_hue_offset_keeps_top_level_hues_apart() {
        for offset in [1e16, -3.25, 7.5e9] {
            let config = ColorConfig {
                hue_offset: offset,
                ..ColorConfig::default()
            };
            let hues: Vec<f64> = config.top_trajectory().sample(3).iter().map(|c| c.h).collect();
            for (i, a) in hues.iter().enumerate() {
                for b in &hues[i + 1..] {
                    assert!(
                        (hue_distance(*a, *b) - 1.0 / 3.0).abs() < 1e-6,
                        "offset {offset}: {hues:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn empty_documents_yield_defaults() {
        assert_eq!(
            PipelineConfig::from_bytes(b"{}").unwrap(),
            PipelineConfig::default()
        );
        assert_eq!(
            PipelineConfig::from_bytes(b"").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn parses_partial_toml() {
        let toml = br#"
strategy = "prefix"
root_label = "Offences"

[colors]
hue_offset = 0.25

[colors.gamut]
max = 0.8

[filter]
drop_wildcards = true
"#;
        let config = PipelineConfig::from_bytes(toml).unwrap();
        assert_eq!(config.strategy, InferenceStrategy::Prefix);
        assert_eq!(config.root_label, "Offences");
        assert_eq!(config.colors.hue_offset, 0.25);
        assert_eq!(config.colors.gamut.max, 0.8);
        assert_eq!(config.colors.gamut.min, GamutCurve::default().min);
        assert!(config.filter.drop_wildcards);
        assert_eq!(config.colors.top, ColorConfig::default().top);
    }

    #[test]
    fn parses_json() {
        let json = br#"{"colors": {"children": {"hue_exponent": 2.0}}}"#;
        let config = PipelineConfig::from_bytes(json).unwrap();
        assert_eq!(config.colors.children.hue_exponent, 2.0);
        assert_eq!(config.root_label, DEFAULT_ROOT_LABEL);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = PipelineConfig::from_bytes(br#"{"colors": {"gamut": {"max": 1.5}}}"#)
            .unwrap_err();
        assert!(err.is_input_error());

        let err = PipelineConfig::from_bytes(br#"{"root_label": "  "}"#).unwrap_err();
        assert!(err.to_string().contains("root_label"));

        let err = PipelineConfig::from_bytes(
            br#"{"colors": {"top": {"saturation": {"start": 1.2, "end": 0.5}}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("colors.top"));
    }

    #[test]
    fn rejects_garbage() {
        let err = PipelineConfig::from_bytes(b"strategy = [").unwrap_err();
        assert!(matches!(err, HierarchyError::Parse(_)));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "root_label = \"All\"\n").unwrap();
        assert_eq!(PipelineConfig::from_file(&path).unwrap().root_label, "All");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            PipelineConfig::from_file(&missing).unwrap_err(),
            HierarchyError::Io(_)
        ));
    }
}
