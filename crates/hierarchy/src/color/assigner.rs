use super::gamut::GamutTable;
use super::hsv::CssColor;
use super::trajectory::{ChannelPath, HueSample, HueTrajectory, HueWindow};
use crate::config::ColorConfig;
use crate::error::{HierarchyError, Result};
use crate::tree::HierarchyTree;
use crate::types::{ColorNode, HierarchyNode};
use petgraph::graph::NodeIndex;

/// Recursive hue partitioning over the hierarchy
///
/// Top-level categories split the full circle. Every deeper family is
/// spread across a window centred on its parent's hue whose width is the
/// parent's own slice scaled by the gamut curve, so a subtree never leaves
/// the slice of its ancestor and siblings never share a hue.
#[derive(Debug, Clone, Default)]
pub struct HierarchicalColorAssigner {
    config: ColorConfig,
}

impl HierarchicalColorAssigner {
    pub fn new(config: ColorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ColorConfig {
        &self.config
    }

    pub fn assign_colors(&self, nodes: Vec<HierarchyNode>) -> Result<Vec<ColorNode>> {
        self.config.validate()?;
        let tree = HierarchyTree::new(&nodes)?;
        tree.verify()?;

        let table = self.config.gamut.tabulate(tree.max_children());
        let mut samples: Vec<Option<HueSample>> = vec![None; tree.len()];

        let top = top_level(&tree);
        let circle = self.config.top_trajectory();
        for (idx, sample) in top.iter().zip(circle.sample_windows(top.len())) {
            samples[idx.index()] = Some(sample);
        }

        for idx in tree.breadth_first() {
            let Some(parent) = samples[idx.index()] else {
                continue;
            };
            let children = tree.children(idx);
            if children.is_empty() {
                continue;
            }
            let depth = tree.node(children[0]).level;
            let trajectory = self.family_trajectory(&parent, children.len(), depth, &table);
            for (child, sample) in children.iter().zip(trajectory.sample_windows(children.len())) {
                samples[child.index()] = Some(sample);
            }
        }

        log::debug!(
            "Coloured {} nodes under {} top-level categories (largest family {})",
            tree.len(),
            top.len(),
            table.max_children()
        );

        tree.into_nodes()
            .into_iter()
            .zip(samples)
            .map(|(node, sample)| match sample {
                Some(sample) => Ok(ColorNode {
                    node,
                    hsv: Some(sample.hsv),
                    color: sample.hsv.to_css(),
                }),
                None if node.is_root() => Ok(ColorNode {
                    node,
                    hsv: None,
                    color: CssColor::TRANSPARENT,
                }),
                None => Err(HierarchyError::inconsistent(format!(
                    "{} was never reached from a top-level category",
                    node.key
                ))),
            })
            .collect()
    }

    /// Path for the children of `parent`, sitting on level `depth`
    fn family_trajectory(
        &self,
        parent: &HueSample,
        children: usize,
        depth: u8,
        table: &GamutTable,
    ) -> HueTrajectory {
        let slice = parent.window;
        let width = slice.width() * table.width_for(children);
        let window = fit_inside(HueWindow::centred(parent.hue, width), &slice);

        let shift = self.config.level_value_shift * f64::from(depth.saturating_sub(2));
        let paths = &self.config.children;
        HueTrajectory::across(
            window,
            paths.hue_exponent,
            paths.saturation,
            shifted(paths.value, shift),
        )
    }
}

/// Categories that split the full circle: the children of the synthetic
/// root, or every parentless node when there is none
fn top_level(tree: &HierarchyTree) -> Vec<NodeIndex> {
    let mut top = Vec::new();
    for root in tree.roots() {
        if tree.node(root).is_root() {
            top.extend(tree.children(root));
        } else {
            top.push(root);
        }
    }
    top.sort_unstable();
    top
}

/// Slide `window` until it lies within `outer`. A bent hue path can put the
/// parent hue off-centre in its slice.
fn fit_inside(window: HueWindow, outer: &HueWindow) -> HueWindow {
    let width = window.width().min(outer.width());
    let start = window.start.clamp(outer.start, outer.end - width);
    HueWindow {
        start,
        end: start + width,
    }
}

fn shifted(path: ChannelPath, by: f64) -> ChannelPath {
    ChannelPath::new(
        (path.start + by).clamp(0.0, 1.0),
        (path.end + by).clamp(0.0, 1.0),
        path.exponent,
    )
}
