use crate::color::hsv::{CssColor, Hsv};
use crate::error::{HierarchyError, Result};
use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A key placed in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub key: Key,

    /// 0 for the synthetic root, 1 for top categories, up to 6
    pub level: u8,

    /// `None` only for the synthetic root and, before the root is attached,
    /// for level-1 nodes
    pub parent: Option<Key>,
}

impl HierarchyNode {
    pub fn root() -> Self {
        Self {
            key: Key::ROOT,
            level: 0,
            parent: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.key.is_root()
    }
}

/// A node with its share of the radial layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    #[serde(flatten)]
    pub node: HierarchyNode,

    /// Fraction of the full circle, in `(0, 1]`
    pub sectionwidth: f64,
}

/// A node with its assigned colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorNode {
    #[serde(flatten)]
    pub node: HierarchyNode,

    /// HSV source of `color`; absent for the synthetic root
    pub hsv: Option<Hsv>,

    pub color: CssColor,
}

/// One row of the merged output handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub key: Key,
    pub level: u8,
    pub parent: Option<Key>,

    /// Number of direct children
    pub children: usize,

    pub sectionwidth: f64,
    pub color: CssColor,
}

/// The merged `{key, level, parent, sectionwidth, color}` table, keyed by key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableRows")]
pub struct CatalogTable {
    /// Display name of the synthetic root
    pub root_label: String,

    records: Vec<CatalogRecord>,

    #[serde(skip)]
    index: HashMap<Key, usize>,
}

#[derive(Deserialize)]
struct TableRows {
    root_label: String,
    records: Vec<CatalogRecord>,
}

impl From<TableRows> for CatalogTable {
    fn from(rows: TableRows) -> Self {
        Self::from_records(rows.root_label, rows.records)
    }
}

impl CatalogTable {
    /// Join layout and colour rows on their key.
    ///
    /// Both inputs must describe the same set of keys; `layout` decides the
    /// row order.
    pub fn join(
        root_label: impl Into<String>,
        layout: Vec<LayoutNode>,
        colors: Vec<ColorNode>,
    ) -> Result<Self> {
        if layout.len() != colors.len() {
            return Err(HierarchyError::inconsistent(format!(
                "layout has {} rows but colouring has {}",
                layout.len(),
                colors.len()
            )));
        }

        let color_by_key: HashMap<Key, CssColor> =
            colors.iter().map(|c| (c.node.key, c.color)).collect();

        let mut children: HashMap<Key, usize> = HashMap::new();
        for row in &layout {
            if let Some(parent) = row.node.parent {
                *children.entry(parent).or_insert(0) += 1;
            }
        }

        let mut records = Vec::with_capacity(layout.len());
        for row in layout {
            let color = color_by_key.get(&row.node.key).copied().ok_or_else(|| {
                HierarchyError::inconsistent(format!("no colour assigned to {}", row.node.key))
            })?;
            records.push(CatalogRecord {
                key: row.node.key,
                level: row.node.level,
                parent: row.node.parent,
                children: children.get(&row.node.key).copied().unwrap_or(0),
                sectionwidth: row.sectionwidth,
                color,
            });
        }

        Ok(Self::from_records(root_label, records))
    }

    pub fn from_records(root_label: impl Into<String>, records: Vec<CatalogRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.key, idx))
            .collect();
        Self {
            root_label: root_label.into(),
            records,
            index,
        }
    }

    pub fn get(&self, key: &Key) -> Option<&CatalogRecord> {
        self.index
            .get(key)
            .and_then(|&idx| self.records.get(idx))
            .filter(|record| record.key == *key)
    }

    pub fn require(&self, key: &Key) -> Result<&CatalogRecord> {
        self.get(key)
            .ok_or_else(|| HierarchyError::KeyNotFound(key.to_string()))
    }

    pub fn root(&self) -> Option<&CatalogRecord> {
        self.get(&Key::ROOT)
    }

    /// Direct children of `key`, in table order
    pub fn children_of<'a>(&'a self, key: &'a Key) -> impl Iterator<Item = &'a CatalogRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.parent.as_ref() == Some(key))
    }

    /// Display name of a key: the root label for the sentinel, the key itself otherwise
    pub fn display_name(&self, key: &Key) -> String {
        if key.is_root() {
            self.root_label.clone()
        } else {
            key.to_string()
        }
    }

    /// Every key's colour, as consumed by charts keyed by category
    pub fn color_map(&self) -> HashMap<Key, CssColor> {
        self.records.iter().map(|r| (r.key, r.color)).collect()
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> Key {
        Key::parse(raw).unwrap()
    }

    fn node(raw: &str, level: u8, parent: Option<Key>) -> HierarchyNode {
        HierarchyNode {
            key: key(raw),
            level,
            parent,
        }
    }

    #[test]
    fn join_counts_children_and_indexes_rows() {
        let root = HierarchyNode::root();
        let a = node("100000", 1, Some(Key::ROOT));
        let b = node("200000", 1, Some(Key::ROOT));
        let layout = vec![
            LayoutNode { node: root, sectionwidth: 1.0 },
            LayoutNode { node: a, sectionwidth: 0.5 },
            LayoutNode { node: b, sectionwidth: 0.5 },
        ];
        let colors = vec![
            ColorNode { node: b, hsv: None, color: CssColor::Hex { r: 0, g: 0, b: 255 } },
            ColorNode { node: root, hsv: None, color: CssColor::TRANSPARENT },
            ColorNode { node: a, hsv: None, color: CssColor::Hex { r: 255, g: 0, b: 0 } },
        ];

        let table = CatalogTable::join("root", layout, colors).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.root().unwrap().children, 2);
        assert_eq!(table.require(&key("200000")).unwrap().color.to_string(), "#0000ff");
        assert_eq!(table.children_of(&Key::ROOT).count(), 2);
        assert_eq!(table.display_name(&Key::ROOT), "root");
        assert!(table.require(&key("300000")).is_err());
    }

    #[test]
    fn join_rejects_mismatched_inputs() {
        let a = node("100000", 1, None);
        let layout = vec![LayoutNode { node: a, sectionwidth: 1.0 }];
        let other = node("200000", 1, None);
        let colors = vec![ColorNode { node: other, hsv: None, color: CssColor::TRANSPARENT }];
        let err = CatalogTable::join("root", layout, colors).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn records_serialize_with_flat_fields() {
        let table = CatalogTable::from_records(
            "root",
            vec![CatalogRecord {
                key: Key::ROOT,
                level: 0,
                parent: None,
                children: 0,
                sectionwidth: 1.0,
                color: CssColor::TRANSPARENT,
            }],
        );
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["records"][0]["key"], "------");
        assert_eq!(json["records"][0]["color"], "rgba(0,0,0,0)");
        assert!(json["records"][0]["parent"].is_null());

        let back: CatalogTable = serde_json::from_value(json).unwrap();
        assert!(back.root().is_some());
    }

    #[test]
    fn lookup_survives_a_stale_index() {
        let record = |raw: &str| CatalogRecord {
            key: key(raw),
            level: 1,
            parent: Some(Key::ROOT),
            children: 0,
            sectionwidth: 0.5,
            color: CssColor::TRANSPARENT,
        };
        let mut table = CatalogTable::from_records("root", vec![record("100000"), record("200000")]);
        assert_eq!(table.records().len(), 2);

        table.records.truncate(1);
        assert!(table.get(&key("200000")).is_none());
        assert!(table.require(&key("200000")).is_err());

        table.records[0] = record("300000");
        assert!(table.get(&key("100000")).is_none());
    }
}
