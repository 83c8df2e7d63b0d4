use crate::error::{HierarchyError, Result};
use crate::key::{first_difference, validate_sorted, Key, MAX_LEVEL};
use crate::tree::HierarchyTree;
use crate::types::HierarchyNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How parents are inferred from the keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceStrategy {
    /// Single pass over the sorted keys; depth comes from how many leading
    /// characters a key shares with its predecessor
    #[default]
    Sequential,

    /// Trailing zeros stripped, a key's parent is the longest proper prefix
    /// that is itself in the catalogue
    Prefix,
}

/// Reconstructs the implicit hierarchy of one sorted key universe
#[derive(Debug, Clone, Default)]
pub struct KeyHierarchyBuilder {
    strategy: InferenceStrategy,
}

impl KeyHierarchyBuilder {
    pub fn new(strategy: InferenceStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> InferenceStrategy {
        self.strategy
    }

    /// Infer level and parent for each key.
    ///
    /// `keys` must be strictly ascending under the key comparator and come
    /// from a single universe. Level-1 nodes are returned without a parent;
    /// every other node sits exactly one level below its parent.
    pub fn infer(&self, keys: &[Key]) -> Result<Vec<HierarchyNode>> {
        validate_sorted(keys)?;
        let Some(first) = keys.first() else {
            return Ok(Vec::new());
        };

        if let Some(other) = keys.iter().find(|k| k.universe() != first.universe()) {
            return Err(HierarchyError::invalid_input(format!(
                "{first} and {other} belong to different key universes"
            )));
        }

        let raw = match self.strategy {
            InferenceStrategy::Sequential => infer_sequential(keys)?,
            InferenceStrategy::Prefix => infer_prefix(keys),
        };

        let mut tree = HierarchyTree::new(&raw)?;
        let corrected = tree.relevel();
        tree.verify()?;

        log::debug!(
            "Inferred {} {:?} keys ({:?}), {} re-leveled",
            keys.len(),
            first.universe(),
            self.strategy,
            corrected
        );

        Ok(tree.into_nodes())
    }
}

/// Raw depth of each key: one plus the first position where it differs from
/// its predecessor. The first key is level 1.
fn detect_levels(keys: &[Key]) -> Result<Vec<u8>> {
    let mut levels = Vec::with_capacity(keys.len());
    levels.push(1);
    for pair in keys.windows(2) {
        let pos = first_difference(&pair[0], &pair[1]).ok_or_else(|| {
            HierarchyError::inconsistent(format!("{} follows itself", pair[1]))
        })?;
        levels.push(pos as u8 + 1);
    }
    Ok(levels)
}

/// Index of the most recent key seen at each raw level
#[derive(Debug, Default)]
struct LevelStack {
    last: [Option<usize>; MAX_LEVEL as usize + 1],
}

impl LevelStack {
    fn record(&mut self, level: u8, idx: usize) {
        self.last[usize::from(level)] = Some(idx);
    }

    /// Most recent key whose raw level lies strictly above (below in number)
    /// `level`
    fn nearest_shallower(&self, level: u8) -> Option<usize> {
        self.last[1..usize::from(level)].iter().flatten().copied().max()
    }
}

fn infer_sequential(keys: &[Key]) -> Result<Vec<HierarchyNode>> {
    let levels = detect_levels(keys)?;

    let (_, nodes) = keys.iter().zip(&levels).enumerate().try_fold(
        (LevelStack::default(), Vec::with_capacity(keys.len())),
        |(mut stack, mut nodes), (idx, (&key, &level))| {
            let parent = if level == 1 {
                None
            } else {
                let predecessor_level = levels[idx - 1];
                // Deeper than the predecessor: the predecessor is the parent.
                // Same depth or shallower: the closest earlier key on a
                // shallower level. The former is a special case of the latter.
                let parent_idx = if level > predecessor_level {
                    Some(idx - 1)
                } else {
                    stack.nearest_shallower(level)
                };
                let parent_idx = parent_idx.ok_or_else(|| {
                    HierarchyError::inconsistent(format!(
                        "no ancestor for {key} on raw level {level}"
                    ))
                })?;
                Some(keys[parent_idx])
            };

            stack.record(level, idx);
            nodes.push(HierarchyNode { key, level, parent });
            Ok::<_, HierarchyError>((stack, nodes))
        },
    )?;

    Ok(nodes)
}

/// Parents by longest present prefix. Levels are placeholders (prefix
/// length) until the tree re-levels them: a parent may sort after its child
/// when `*` follows the prefix.
fn infer_prefix(keys: &[Key]) -> Vec<HierarchyNode> {
    let by_prefix: HashMap<&str, Key> = keys
        .iter()
        .map(|k| (k.significant_prefix(), *k))
        .collect();

    keys.iter()
        .map(|&key| {
            let prefix = key.significant_prefix();
            let parent = (1..prefix.len())
                .rev()
                .find_map(|len| by_prefix.get(&prefix[..len]).copied());
            let level = match parent {
                Some(_) => prefix.len().min(usize::from(MAX_LEVEL)) as u8,
                None => 1,
            };
            HierarchyNode { key, level, parent }
        })
        .collect()
}
