//! Colour model, hue trajectories and the recursive assigner.

pub mod assigner;
pub mod gamut;
pub mod hsv;
pub mod trajectory;

pub use assigner::HierarchicalColorAssigner;
pub use gamut::{GamutCurve, GamutTable};
pub use hsv::{hue_distance, wrap_hue, CssColor, Hsv};
pub use trajectory::{
    ChannelPath, HueSample, HueTrajectory, HueWindow, TrajectoryFormat, TrajectoryPoint,
};
