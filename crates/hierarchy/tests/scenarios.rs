use catalog_hierarchy::{
    attach_root, compare_keys, CatalogPipeline, HierarchicalColorAssigner, HierarchyError,
    HierarchyNode, Key, KeyFilter, KeyHierarchyBuilder, KeyPartition, LayoutWeightComputer,
};
use pretty_assertions::assert_eq;
use std::cmp::Ordering;

fn key(raw: &str) -> Key {
    Key::parse(raw).unwrap()
}

fn keys(raw: &[&str]) -> Vec<Key> {
    raw.iter().map(|r| key(r)).collect()
}

#[test]
fn chain_then_second_top_level_category() {
    let nodes = KeyHierarchyBuilder::default()
        .infer(&keys(&["100000", "110000", "111000", "200000"]))
        .unwrap();

    let levels: Vec<u8> = nodes.iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![1, 2, 3, 1]);

    let parents: Vec<Option<Key>> = nodes.iter().map(|n| n.parent).collect();
    assert_eq!(
        parents,
        vec![None, Some(key("100000")), Some(key("110000")), None]
    );
}

#[test]
fn six_level_chain_reaches_the_depth_limit() {
    let raw = [
        "100000", "110000", "111000", "111100", "111110", "111111", "111112", "200000",
    ];
    let table = CatalogPipeline::default()
        .run(&KeyPartition::from_sorted_keys(keys(&raw)).unwrap())
        .unwrap();

    let levels: Vec<u8> = raw
        .iter()
        .map(|r| table.require(&key(r)).unwrap().level)
        .collect();
    assert_eq!(levels, vec![1, 2, 3, 4, 5, 6, 6, 1]);

    let last = table.require(&key("111112")).unwrap();
    assert_eq!(last.parent, Some(key("111110")));
    assert_eq!(table.require(&key("111110")).unwrap().children, 2);

    assert_eq!(table.require(&key("111110")).unwrap().sectionwidth, 0.5);
    assert_eq!(table.require(&key("111111")).unwrap().sectionwidth, 0.25);
    assert_eq!(last.sectionwidth, 0.25);
}

#[test]
fn two_categories_split_the_root() {
    let nodes = KeyHierarchyBuilder::default()
        .infer(&keys(&["100000", "200000"]))
        .unwrap();
    let layout = LayoutWeightComputer::new()
        .assign_weights(attach_root(nodes).unwrap())
        .unwrap();

    assert!(layout[0].node.is_root());
    assert_eq!(layout[0].sectionwidth, 1.0);
    assert_eq!(layout[1].sectionwidth, 0.5);
    assert_eq!(layout[2].sectionwidth, 0.5);
}

#[test]
fn single_child_chain_is_never_subdivided() {
    let table = CatalogPipeline::default()
        .run(&KeyPartition::from_sorted_keys(keys(&["100000", "110000", "111000"])).unwrap())
        .unwrap();

    let root = table.root().unwrap().sectionwidth;
    let deepest = table.require(&key("111000")).unwrap();
    assert_eq!(deepest.level, 3);
    assert_eq!(deepest.sectionwidth, root);
}

#[test]
fn large_family_gets_wider_gamut_but_stays_in_its_slice() {
    // A (8 children), B (2 children) and C (leaf) under the root
    let mut raw = vec!["100000".to_string()];
    raw.extend((1..=8).map(|i| format!("1{i}0000")));
    raw.push("200000".into());
    raw.extend((1..=2).map(|i| format!("2{i}0000")));
    raw.push("300000".into());

    let partition = KeyPartition::from_unsorted(&raw, &KeyFilter::default()).unwrap();
    let pipeline = CatalogPipeline::default();
    let nodes = pipeline.hierarchize(&partition).unwrap();
    let colors = HierarchicalColorAssigner::default()
        .assign_colors(nodes)
        .unwrap();

    let hue = |raw: &str| {
        let k = key(raw);
        colors
            .iter()
            .find(|c| c.node.key == k)
            .and_then(|c| c.hsv)
            .unwrap()
            .h
    };

    let spread = |prefix: char, count: usize| {
        let first = hue(&format!("{prefix}10000"));
        let last = hue(&format!("{prefix}{count}0000"));
        last - first
    };
    assert!(spread('1', 8) > spread('2', 2));

    // Each third of the circle belongs to one top-level category
    let third = 1.0 / 3.0;
    for i in 1..=8 {
        let h = hue(&format!("1{i}0000"));
        assert!((0.0..third).contains(&h), "A child {i} at {h}");
    }
    for i in 1..=2 {
        let h = hue(&format!("2{i}0000"));
        assert!((third..2.0 * third).contains(&h), "B child {i} at {h}");
    }
    let c = hue("300000");
    assert!((2.0 * third..1.0).contains(&c));
}

#[test]
fn asterisk_ranks_below_digits() {
    assert_eq!(compare_keys(&key("12*000"), &key("123000")), Ordering::Less);
    assert_eq!(compare_keys(&key("123000"), &key("12*000")), Ordering::Greater);
    assert!(key("1*9999") < key("100000"));
}

#[test]
fn empty_and_singleton_inputs_are_valid() {
    let builder = KeyHierarchyBuilder::default();
    assert!(builder.infer(&[]).unwrap().is_empty());

    let single = builder.infer(&keys(&["500000"])).unwrap();
    assert_eq!(
        single,
        vec![HierarchyNode {
            key: key("500000"),
            level: 1,
            parent: None
        }]
    );

    let table = CatalogPipeline::default().run(&KeyPartition::default()).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.root().unwrap().color.to_string(), "rgba(0,0,0,0)");
}

#[test]
fn bad_inputs_fail_before_inference() {
    let unsorted = KeyPartition::new(Vec::new(), keys(&["200000", "100000"]));
    assert!(matches!(unsorted, Err(HierarchyError::InvalidInput(_))));

    let duplicate = KeyPartition::new(Vec::new(), keys(&["100000", "100000"]));
    assert!(matches!(duplicate, Err(HierarchyError::InvalidInput(_))));

    assert!(matches!(
        Key::parse("10000"),
        Err(HierarchyError::InvalidInput(_))
    ));
    assert!(matches!(
        Key::parse("1000000"),
        Err(HierarchyError::InvalidInput(_))
    ));
}

#[test]
fn summary_keys_can_be_filtered() {
    let filter = KeyFilter {
        summary_floor: Some(890_000),
        ..KeyFilter::default()
    };
    let partition =
        KeyPartition::from_unsorted(["100000", "890000", "899000", "------", ""], &filter).unwrap();
    assert_eq!(partition.numeric(), keys(&["100000"]).as_slice());
}

#[test]
fn table_round_trips_through_json() {
    let table = CatalogPipeline::default()
        .run(&KeyPartition::from_sorted_keys(keys(&["1*0000", "100000", "110000"])).unwrap())
        .unwrap();
    let json = serde_json::to_string(&table).unwrap();
    let back: catalog_hierarchy::CatalogTable = serde_json::from_str(&json).unwrap();
    assert_eq!(back, table);
    assert_eq!(back.require(&key("110000")).unwrap().level, 2);
}
