//! # Catalog Hierarchy
//!
//! Turns a flat list of six-character classification keys into an annotated
//! tree ready for radial charts.
//!
//! ## Features
//!
//! - **Hierarchy inference** - levels and parents from the sorted keys alone
//! - **Layout weights** - equal-angle section widths per family
//! - **Recursive colouring** - hue windows that nest like the tree does
//! - **Configurable palettes** - JSON/TOML config with presets
//!
//! ## Architecture
//!
//! ```text
//! raw keys
//!     │
//!     ├──> KeyPartition (filter, dedupe, sort, split by universe)
//!     │
//!     ├──> KeyHierarchyBuilder (per universe)
//!     │      ├─ Sequential: first differing position = depth
//!     │      └─ Prefix: longest present prefix = parent
//!     │
//!     ├──> HierarchyTree (petgraph)
//!     │      ├─ synthetic root on level 0
//!     │      └─ re-level + verify
//!     │
//!     ├──> LayoutWeightComputer ──> sectionwidth
//!     ├──> HierarchicalColorAssigner ──> CSS colour
//!     │
//!     └──> CatalogTable {key, level, parent, children, sectionwidth, color}
//! ```

mod builder;
pub mod color;
mod config;
mod error;
mod key;
mod layout;
mod pipeline;
mod tree;
mod types;

pub use builder::{InferenceStrategy, KeyHierarchyBuilder};
pub use color::{
    ChannelPath, CssColor, GamutCurve, HierarchicalColorAssigner, Hsv, HueTrajectory, HueWindow,
    TrajectoryFormat, TrajectoryPoint,
};
pub use config::{ChannelPaths, ColorConfig, PipelineConfig, DEFAULT_ROOT_LABEL};
pub use error::{HierarchyError, Result};
pub use key::{
    compare_keys, first_difference, validate_sorted, Key, KeyFilter, KeyPartition, KeyUniverse,
    KEY_WIDTH, MAX_LEVEL, ROOT_SENTINEL,
};
pub use layout::LayoutWeightComputer;
pub use pipeline::CatalogPipeline;
pub use tree::{attach_root, HierarchyTree};
pub use types::{CatalogRecord, CatalogTable, ColorNode, HierarchyNode, LayoutNode};
