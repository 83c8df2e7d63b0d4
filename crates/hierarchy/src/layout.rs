use crate::error::Result;
use crate::tree::HierarchyTree;
use crate::types::{HierarchyNode, LayoutNode};

/// Equal-angle section widths for a radial layout
///
/// A parent's width is split evenly between its direct children, no matter
/// how large each child's subtree is. The synthetic root gets the whole
/// circle; without a root, parentless nodes share it evenly.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutWeightComputer;

impl LayoutWeightComputer {
    pub fn new() -> Self {
        Self
    }

    pub fn assign_weights(&self, nodes: Vec<HierarchyNode>) -> Result<Vec<LayoutNode>> {
        let tree = HierarchyTree::new(&nodes)?;
        tree.verify()?;

        let mut widths = vec![0.0_f64; tree.len()];
        let roots = tree.roots();
        if !roots.is_empty() {
            let share = 1.0 / roots.len() as f64;
            for root in &roots {
                widths[root.index()] = share;
            }
        }

        // parents come before children, so each share is final when read
        for idx in tree.breadth_first() {
            let children = tree.children(idx);
            if children.is_empty() {
                continue;
            }
            let share = widths[idx.index()] / children.len() as f64;
            for child in children {
                widths[child.index()] = share;
            }
        }

        log::debug!("Assigned section widths to {} nodes", widths.len());

        Ok(tree
            .into_nodes()
            .into_iter()
            .zip(widths)
            .map(|(node, sectionwidth)| LayoutNode { node, sectionwidth })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::tree::attach_root;

    fn key(raw: &str) -> Key {
        Key::parse(raw).unwrap()
    }

    fn node(raw: &str, level: u8, parent: Option<&str>) -> HierarchyNode {
        HierarchyNode {
            key: key(raw),
            level,
            parent: parent.map(key),
        }
    }

    fn width_of(rows: &[LayoutNode], raw: &str) -> f64 {
        let k = key(raw);
        rows.iter().find(|r| r.node.key == k).unwrap().sectionwidth
    }

    #[test]
    fn two_top_level_keys_split_in_half() {
        let nodes = attach_root(vec![node("100000", 1, None), node("200000", 1, None)]).unwrap();
        let rows = LayoutWeightComputer::new().assign_weights(nodes).unwrap();
        assert_eq!(rows[0].sectionwidth, 1.0);
        assert_eq!(width_of(&rows, "100000"), 0.5);
        assert_eq!(width_of(&rows, "200000"), 0.5);
    }

    #[test]
    fn single_child_chain_keeps_full_width() {
        let nodes = attach_root(vec![
            node("100000", 1, None),
            node("110000", 2, Some("100000")),
            node("111000", 3, Some("110000")),
        ])
        .unwrap();
        let rows = LayoutWeightComputer::new().assign_weights(nodes).unwrap();
        assert_eq!(width_of(&rows, "111000"), rows[0].sectionwidth);
    }

    #[test]
    fn width_ignores_subtree_size() {
        let nodes = attach_root(vec![
            node("100000", 1, None),
            node("110000", 2, Some("100000")),
            node("120000", 2, Some("100000")),
            node("130000", 2, Some("100000")),
            node("200000", 1, None),
        ])
        .unwrap();
        let rows = LayoutWeightComputer::new().assign_weights(nodes).unwrap();
        assert_eq!(width_of(&rows, "100000"), width_of(&rows, "200000"));
        let children: f64 = ["110000", "120000", "130000"]
            .iter()
            .map(|k| width_of(&rows, k))
            .sum();
        assert!((children - width_of(&rows, "100000")).abs() < 1e-9);
    }

    #[test]
    fn parentless_nodes_share_the_circle_without_root() {
        let rows = LayoutWeightComputer::new()
            .assign_weights(vec![
                node("100000", 1, None),
                node("200000", 1, None),
                node("300000", 1, None),
                node("310000", 2, Some("300000")),
            ])
            .unwrap();
        let top: f64 = rows
            .iter()
            .filter(|r| r.node.parent.is_none())
            .map(|r| r.sectionwidth)
            .sum();
        assert!((top - 1.0).abs() < 1e-12);
        assert_eq!(width_of(&rows, "310000"), width_of(&rows, "300000"));
    }

    #[test]
    fn empty_input_gives_empty_layout() {
        let rows = LayoutWeightComputer::new().assign_weights(Vec::new()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn rejects_inconsistent_levels() {
        let err = LayoutWeightComputer::new()
            .assign_weights(vec![node("100000", 1, None), node("110000", 4, Some("100000"))])
            .unwrap_err();
        assert!(err.is_internal());
    }
}
