use std::{collections::HashSet, fs};

use assert_matches::assert_matches;
use nestree::{
    build_forest, commit_flat, commit_forest, count_nodes, flatten_sorted, graph::write_dot_file,
    pivot_index, rebuild_forest, select_reads,
    serializer::{read_records_file, read_tree_file, write_records_file, write_tree_file},
    tree_height, Blake3Combiner, CompositeKey, Error, FlatKind, GeneratorOptions, GroupingScope,
    NodeKind, Record, RecordGenerator,
};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, SeedableRng};
use tempfile::TempDir;

fn record(components: &[u64], value: u64) -> Record {
    Record::new(CompositeKey::new(components.to_vec()).unwrap(), value)
}

fn generated(seed: u64) -> Vec<Record> {
    let options = GeneratorOptions {
        contracts: 2,
        attributes: 2,
        fields: 12,
        ..Default::default()
    };
    RecordGenerator::new(options)
        .unwrap()
        .generate(&mut StdRng::seed_from_u64(seed))
}

#[test]
fn fields_of_one_attribute() {
    let records = [
        record(&[0, 0, 0], 5),
        record(&[0, 0, 1, 3], 7),
        record(&[0, 0, 1, 9], 2),
    ];
    let forest = build_forest(&records, &GroupingScope::under(&[0, 0])).unwrap();

    assert_eq!(forest.len(), 2);
    assert_eq!(pivot_index(forest.len()), Some(1));
    assert_eq!(forest[0].value(), Some(5));
    match &forest[1].kind {
        NodeKind::SubtreeRoot(children) => {
            let leaves: Vec<(u64, Option<u64>)> =
                children.iter().map(|c| (c.key, c.value())).collect();
            assert_eq!(leaves, vec![(3, Some(7)), (9, Some(2))]);
        }
        NodeKind::Leaf(_) => panic!("field 1 must root a nested forest"),
    }
}

#[test]
fn generated_records_survive_the_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("initial_set.txt");
    let records = generated(3);

    write_records_file(&path, &records).value.unwrap();
    assert_eq!(read_records_file(&path).value.unwrap(), records);
}

#[test]
fn committed_tree_verifies_after_reading_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sorted_hashes.txt");

    let mut forest = build_forest(&generated(8), &GroupingScope::global()).unwrap();
    let root_hash = commit_forest(&mut forest, &Blake3Combiner).unwrap();
    let flat = flatten_sorted(&forest);
    assert_eq!(flat.len(), count_nodes(&forest));

    let written = write_tree_file(&path, &flat);
    assert_eq!(
        written.cost.bytes_written,
        fs::metadata(&path).unwrap().len()
    );
    written.value.unwrap();

    let mut read = read_tree_file(&path).value.unwrap();
    let stored: Vec<u64> = read.iter().map(|node| node.root_hash).collect();
    for node in read.iter_mut() {
        node.root_hash = 0;
    }

    let ctx = commit_flat(&mut read, &Blake3Combiner);
    assert_eq!(ctx.value.unwrap(), root_hash);
    assert_eq!(ctx.cost.combine_calls as usize, read.len());
    let recomputed: Vec<u64> = read.iter().map(|node| node.root_hash).collect();
    assert_eq!(recomputed, stored);

    let rebuilt = rebuild_forest(&read).unwrap();
    assert_eq!(rebuilt, forest);
}

#[test]
fn tampered_value_changes_the_root() {
    let mut forest = build_forest(&generated(21), &GroupingScope::global()).unwrap();
    let root_hash = commit_forest(&mut forest, &Blake3Combiner).unwrap();

    let mut flat = flatten_sorted(&forest);
    let leaf = flat
        .iter_mut()
        .find(|node| !node.is_subtree_root())
        .unwrap();
    leaf.kind = FlatKind::Leaf(leaf.value().unwrap() + 1);

    let tampered = commit_flat(&mut flat, &Blake3Combiner).value.unwrap();
    assert_ne!(tampered, root_hash);
}

#[test]
fn every_sibling_tree_has_minimal_height() {
    let forest = build_forest(&generated(34), &GroupingScope::global()).unwrap();
    let flat = flatten_sorted(&forest);

    // deepest L/R run below each nesting prefix
    let mut sizes = std::collections::HashMap::<String, (usize, usize)>::new();
    for node in &flat {
        let path = node.path.unmarked();
        let text = path.as_str();
        let split = text.rfind('N').map_or(0, |i| i + 1);
        let entry = sizes.entry(text[..split].to_owned()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.max(text.len() - split);
    }
    for (prefix, (size, depth)) in sizes {
        assert_eq!(Some(depth), tree_height(size), "sibling tree at {prefix:?}");
    }
}

#[test]
fn read_sets_sample_existing_and_missing_keys() {
    let forest = build_forest(&generated(55), &GroupingScope::global()).unwrap();
    let flat = flatten_sorted(&forest);
    let present: HashSet<&CompositeKey> = flat.iter().map(|node| &node.composite_key).collect();

    let mut rng = StdRng::seed_from_u64(55);
    for _ in 0..50 {
        let reads = select_reads(&flat, 4, 1, &mut rng);
        assert!((4..=5).contains(&reads.len()));
        assert!(reads.iter().take(4).all(|key| present.contains(key)));
    }
}

#[test]
fn graph_export_names_every_node() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("initial_graph.dot");
    let forest = build_forest(&generated(13), &GroupingScope::global()).unwrap();
    let flat = flatten_sorted(&forest);

    write_dot_file(&path, &flat).unwrap();
    let dot = fs::read_to_string(&path).unwrap();
    let statements = dot.lines().filter(|line| line.contains("[label=")).count();
    let edges = dot.lines().filter(|line| line.contains(" -> ")).count();
    assert_eq!(statements, flat.len());
    // the top root is the only node without a parent
    assert_eq!(edges, flat.len() - 1);
}

#[test]
fn invalid_record_file_is_rejected_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.txt");
    fs::write(&input, "0 0 0 5\n0 0 1\n").unwrap();

    assert_matches!(
        read_records_file(&input).value,
        Err(Error::MalformedInput(message)) if message.starts_with("line 2")
    );

    fs::write(&input, "0 0 2 5\n0 0 1 4\n").unwrap();
    let records = read_records_file(&input).value.unwrap();
    assert_matches!(
        build_forest(&records, &GroupingScope::global()),
        Err(Error::UnsortedInput { .. })
    );
}
