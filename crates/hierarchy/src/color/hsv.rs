//! HSV colour values and their CSS rendering.
//!
//! Hue, saturation and value all live in `[0, 1]`; hue is cyclic, so `1.0`
//! and `0.0` name the same hue. Conversions follow the classic hexcone
//! model and quantise channels by truncation (`floor(x * 255)`).

use crate::error::{HierarchyError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fold a hue onto the unit circle, `[0, 1)`.
#[inline]
pub fn wrap_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(1.0);
    // rem_euclid of a tiny negative can round up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest distance between two hues on the unit circle
#[inline]
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (wrap_hue(a) - wrap_hue(b)).abs();
    d.min(1.0 - d)
}

#[inline]
fn to_u8(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0) as u8
}

/// A colour in hue/saturation/value space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    /// Hue is wrapped, saturation and value are clamped.
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self {
            h: wrap_hue(h),
            s: s.clamp(0.0, 1.0),
            v: v.clamp(0.0, 1.0),
        }
    }

    /// Channels in `[0, 1]`
    pub fn to_rgb(self) -> (f64, f64, f64) {
        let Self { h, s, v } = self;
        if s == 0.0 {
            return (v, v, v);
        }

        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        match (sector as i64).rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let (r, g, b) = self.to_rgb();
        (to_u8(r), to_u8(g), to_u8(b))
    }

    pub fn to_css(self) -> CssColor {
        let (r, g, b) = self.to_rgb8();
        CssColor::Hex { r, g, b }
    }
}

/// RGB (unit channels) to hue/lightness/saturation
fn rgb_to_hls(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let sumc = maxc + minc;
    let rangec = maxc - minc;
    let l = sumc / 2.0;
    if rangec == 0.0 {
        return (0.0, l, 0.0);
    }

    let s = if l <= 0.5 {
        rangec / sumc
    } else {
        rangec / (2.0 - sumc)
    };

    let rc = (maxc - r) / rangec;
    let gc = (maxc - g) / rangec;
    let bc = (maxc - b) / rangec;
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    (wrap_hue(h / 6.0), l, s)
}

fn hls_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = wrap_hue(hue);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hls_channel(m1, m2, h + 1.0 / 3.0),
        hls_channel(m1, m2, h),
        hls_channel(m1, m2, h - 1.0 / 3.0),
    )
}

/// A colour as the rendering layer consumes it: `#rrggbb` or `rgba(r,g,b,a)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssColor {
    Hex { r: u8, g: u8, b: u8 },
    Rgba { r: u8, g: u8, b: u8, a: f64 },
}

impl CssColor {
    /// Marker colour for nodes that must not be painted
    pub const TRANSPARENT: CssColor = CssColor::Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    pub fn rgb8(&self) -> (u8, u8, u8) {
        match *self {
            Self::Hex { r, g, b } | Self::Rgba { r, g, b, .. } => (r, g, b),
        }
    }

    pub fn alpha(&self) -> f64 {
        match *self {
            Self::Hex { .. } => 1.0,
            Self::Rgba { a, .. } => a,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.alpha() == 0.0
    }

    /// Parse `#rrggbb` or `rgba(r,g,b,a)`.
    pub fn parse(raw: &str) -> Result<Self> {
        let text = raw.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(HierarchyError::invalid_input(format!(
                    "colour {raw:?} is not of the form #rrggbb"
                )));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| {
                    HierarchyError::invalid_input(format!("colour {raw:?}: {e}"))
                })
            };
            return Ok(Self::Hex {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
            });
        }

        let inner = text
            .strip_prefix("rgba(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| {
                HierarchyError::invalid_input(format!("unsupported colour syntax {raw:?}"))
            })?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(HierarchyError::invalid_input(format!(
                "colour {raw:?} needs four rgba components"
            )));
        }
        let channel = |s: &str| {
            s.parse::<u8>()
                .map_err(|e| HierarchyError::invalid_input(format!("colour {raw:?}: {e}")))
        };
        let a = parts[3]
            .parse::<f64>()
            .map_err(|e| HierarchyError::invalid_input(format!("colour {raw:?}: {e}")))?;
        if !(0.0..=1.0).contains(&a) {
            return Err(HierarchyError::invalid_input(format!(
                "colour {raw:?}: alpha outside [0, 1]"
            )));
        }

        Ok(Self::Rgba {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a,
        })
    }

    /// Fill variant of a colour: saturation scaled by `sat`, lightness moved
    /// toward white by `bri` (0 keeps it, 1 gives white). Alpha is kept.
    pub fn desaturate_brighten(self, sat: f64, bri: f64) -> Self {
        let (r, g, b) = self.rgb8();
        let (h, l, s) = rgb_to_hls(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        );

        let s = (s * sat).clamp(0.0, 1.0);
        let l = (l + bri * (1.0 - l)).clamp(0.0, 1.0);
        let (r, g, b) = hls_to_rgb(h, l, s);
        let (r, g, b) = (to_u8(r), to_u8(g), to_u8(b));

        match self {
            Self::Hex { .. } => Self::Hex { r, g, b },
            Self::Rgba { a, .. } => Self::Rgba { r, g, b, a },
        }
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Hex { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Rgba { r, g, b, a } => write!(f, "rgba({r},{g},{b},{a})"),
        }
    }
}

impl Serialize for CssColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CssColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
