use crate::error::{HierarchyError, Result};
use crate::key::{Key, MAX_LEVEL};
use crate::types::HierarchyNode;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;
use std::collections::HashMap;

/// Parent -> child forest over hierarchy nodes
///
/// Node indices follow input order, so sorting by index restores the
/// catalogue order of siblings.
#[derive(Debug)]
pub struct HierarchyTree {
    graph: DiGraph<HierarchyNode, ()>,
    index: HashMap<Key, NodeIndex>,
}

impl HierarchyTree {
    /// Build the forest. Fails on duplicate keys, dangling parents and cycles.
    pub fn new(nodes: &[HierarchyNode]) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(nodes.len(), nodes.len());
        let mut index = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let idx = graph.add_node(*node);
            if index.insert(node.key, idx).is_some() {
                return Err(HierarchyError::invalid_input(format!(
                    "key {} appears more than once",
                    node.key
                )));
            }
        }

        for node in nodes {
            let Some(parent) = node.parent else {
                continue;
            };
            let from = index.get(&parent).copied().ok_or_else(|| {
                HierarchyError::inconsistent(format!(
                    "{} points at missing parent {parent}",
                    node.key
                ))
            })?;
            let to = index[&node.key];
            graph.add_edge(from, to, ());
        }

        if is_cyclic_directed(&graph) {
            return Err(HierarchyError::inconsistent("parent links form a cycle"));
        }

        Ok(Self { graph, index })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, idx: NodeIndex) -> &HierarchyNode {
        &self.graph[idx]
    }

    pub fn find(&self, key: &Key) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.graph.node_weights()
    }

    /// Parentless nodes, in input order
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.parent(idx).is_none())
            .collect()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    /// Direct children, in input order
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.sort_unstable();
        children
    }

    pub fn children_count(&self, idx: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .count()
    }

    /// Largest family among real nodes; the synthetic root is left out
    pub fn max_children(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&idx| !self.graph[idx].is_root())
            .map(|idx| self.children_count(idx))
            .max()
            .unwrap_or(0)
    }

    /// All nodes, every parent before its children
    pub fn breadth_first(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.len());
        for root in self.roots() {
            let mut bfs = Bfs::new(&self.graph, root);
            while let Some(idx) = bfs.next(&self.graph) {
                order.push(idx);
            }
        }
        order
    }

    /// Rewrite every level as `parent.level + 1`, top-down from the roots.
    ///
    /// The synthetic root stays at 0, other parentless nodes land on 1.
    /// Returns how many nodes changed level.
    pub fn relevel(&mut self) -> usize {
        let mut corrected = 0;
        for idx in self.breadth_first() {
            let level = match self.parent(idx) {
                Some(parent) => self.graph[parent].level.saturating_add(1),
                None if self.graph[idx].is_root() => 0,
                None => 1,
            };
            let node = &mut self.graph[idx];
            if node.level != level {
                log::debug!("Re-leveling {}: {} -> {}", node.key, node.level, level);
                node.level = level;
                corrected += 1;
            }
        }
        corrected
    }

    /// Check the level and depth invariants of the forest.
    pub fn verify(&self) -> Result<()> {
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            match self.parent(idx) {
                None if node.is_root() => {
                    if node.level != 0 {
                        return Err(HierarchyError::inconsistent(format!(
                            "root sits on level {}",
                            node.level
                        )));
                    }
                }
                None => {
                    if node.level != 1 {
                        return Err(HierarchyError::inconsistent(format!(
                            "top-level key {} sits on level {}",
                            node.key, node.level
                        )));
                    }
                }
                Some(parent) => {
                    if node.is_root() {
                        return Err(HierarchyError::inconsistent("root has a parent"));
                    }
                    let parent = &self.graph[parent];
                    if u16::from(node.level) != u16::from(parent.level) + 1 {
                        return Err(HierarchyError::inconsistent(format!(
                            "{} on level {} under {} on level {}",
                            node.key, node.level, parent.key, parent.level
                        )));
                    }
                }
            }
            if node.level > MAX_LEVEL {
                return Err(HierarchyError::inconsistent(format!(
                    "{} is {} levels deep, beyond {MAX_LEVEL}",
                    node.key, node.level
                )));
            }
        }
        Ok(())
    }

    /// Nodes back in input order
    pub fn into_nodes(self) -> Vec<HierarchyNode> {
        let (nodes, _) = self.graph.into_nodes_edges();
        nodes.into_iter().map(|n| n.weight).collect()
    }
}

/// Put the synthetic root in front and hang every parentless node under it.
pub fn attach_root(nodes: Vec<HierarchyNode>) -> Result<Vec<HierarchyNode>> {
    if nodes.iter().any(HierarchyNode::is_root) {
        return Err(HierarchyError::invalid_input("root is already attached"));
    }

    let mut out = Vec::with_capacity(nodes.len() + 1);
    out.push(HierarchyNode::root());
    out.extend(nodes.into_iter().map(|mut node| {
        if node.parent.is_none() {
            node.parent = Some(Key::ROOT);
        }
        node
    }));
    Ok(out)
}
