use crate::builder::KeyHierarchyBuilder;
use crate::color::HierarchicalColorAssigner;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::key::KeyPartition;
use crate::layout::LayoutWeightComputer;
use crate::tree::{attach_root, HierarchyTree};
use crate::types::{CatalogTable, HierarchyNode};
use std::time::Instant;

/// Keys in, annotated catalogue out
///
/// Each universe is inferred on its own. The wildcard forest comes first,
/// then the numeric one, and both hang under a single synthetic root before
/// weights and colours are computed over the combined tree.
#[derive(Debug, Clone, Default)]
pub struct CatalogPipeline {
    config: PipelineConfig,
}

impl CatalogPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The combined hierarchy under the synthetic root, with levels checked
    pub fn hierarchize(&self, keys: &KeyPartition) -> Result<Vec<HierarchyNode>> {
        let builder = KeyHierarchyBuilder::new(self.config.strategy);
        let mut nodes = builder.infer(keys.wildcard())?;
        nodes.extend(builder.infer(keys.numeric())?);

        let nodes = attach_root(nodes)?;
        let mut tree = HierarchyTree::new(&nodes)?;
        tree.relevel();
        tree.verify()?;
        Ok(tree.into_nodes())
    }

    pub fn run(&self, keys: &KeyPartition) -> Result<CatalogTable> {
        self.config.validate()?;
        let started = Instant::now();

        let nodes = self.hierarchize(keys)?;
        let layout = LayoutWeightComputer::new().assign_weights(nodes.clone())?;
        let colors = HierarchicalColorAssigner::new(self.config.colors).assign_colors(nodes)?;
        let table = CatalogTable::join(self.config.root_label.clone(), layout, colors)?;

        log::info!(
            "Built catalogue: {} wildcard + {} numeric keys, {} rows in {:?}",
            keys.wildcard().len(),
            keys.numeric().len(),
            table.len(),
            started.elapsed()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::InferenceStrategy;
    use crate::key::{Key, KeyFilter};
    use pretty_assertions::assert_eq;

    fn partition(raw: &[&str]) -> KeyPartition {
        KeyPartition::from_unsorted(raw.iter().copied(), &KeyFilter::default()).unwrap()
    }

    #[test]
    fn empty_input_yields_root_only() {
        let table = CatalogPipeline::default().run(&KeyPartition::default()).unwrap();
        assert_eq!(table.len(), 1);
        let root = table.root().unwrap();
        assert_eq!(root.level, 0);
        assert_eq!(root.sectionwidth, 1.0);
        assert!(root.color.is_transparent());
        assert_eq!(table.display_name(&Key::ROOT), "Straftaten");
    }

    #[test]
    fn wildcard_universe_comes_first() {
        let table = CatalogPipeline::default()
            .run(&partition(&["100000", "1*0000", "110000"]))
            .unwrap();
        let keys: Vec<String> = table.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["------", "1*0000", "100000", "110000"]);
        assert_eq!(table.root().unwrap().children, 2);
    }

    #[test]
    fn prefix_strategy_runs_end_to_end() {
        let config = PipelineConfig {
            strategy: InferenceStrategy::Prefix,
            ..PipelineConfig::default()
        };
        let table = CatalogPipeline::new(config)
            .run(&partition(&["100000", "110000", "111000"]))
            .unwrap();
        let levels: Vec<u8> = table.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn custom_root_label() {
        let config = PipelineConfig {
            root_label: "Offences".into(),
            ..PipelineConfig::default()
        };
        let table = CatalogPipeline::new(config).run(&partition(&["100000"])).unwrap();
        assert_eq!(table.root_label, "Offences");
    }
}
