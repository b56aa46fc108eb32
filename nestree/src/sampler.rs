//! Random read sets for exercising lookups against a committed structure.

use indexmap::IndexSet;
use rand::{seq::index::sample, Rng};
use tracing::{debug, warn};

use crate::{flatten::FlatNode, record::CompositeKey};

/// Picks composite keys to read back: `existing` keys of nodes that are
/// present, followed by up to `missing` keys that are likely absent.
///
/// Existing keys are drawn without replacement rather than by independent
/// picks: the set always holds exactly `min(existing, nodes.len())` existing
/// keys, and at most `missing` more. Fewer than `existing` nodes simply
/// yields all of them. A likely-missing key is the key
/// of a random node with its last component incremented; it is kept only if
/// it is not already in the set, so it may still name a present node that
/// was not drawn. The result holds no duplicates and keeps draw order.
pub fn select_reads<R>(
    nodes: &[FlatNode],
    existing: usize,
    missing: usize,
    rng: &mut R,
) -> IndexSet<CompositeKey>
where
    R: Rng + ?Sized,
{
    let mut reads = IndexSet::with_capacity(existing + missing);
    if nodes.is_empty() {
        return reads;
    }

    if existing > nodes.len() {
        warn!(
            requested = existing,
            available = nodes.len(),
            "fewer nodes than requested existing reads"
        );
    }
    let amount = existing.min(nodes.len());
    for index in sample(rng, nodes.len(), amount) {
        reads.insert(nodes[index].composite_key.clone());
    }
    let drawn = reads.len();

    for _ in 0..missing {
        let source = &nodes[rng.random_range(0..nodes.len())];
        match source.composite_key.with_last_incremented() {
            Some(probe) => {
                if !reads.insert(probe) {
                    debug!(key = %source.composite_key, "missing probe already selected");
                }
            }
            None => warn!(key = %source.composite_key, "cannot derive a missing probe"),
        }
    }

    debug!(
        existing = drawn,
        missing = reads.len() - drawn,
        "selected reads"
    );
    reads
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::flatten::FlatKind;

    fn flat(keys: &[&[u64]]) -> Vec<FlatNode> {
        keys.iter()
            .enumerate()
            .map(|(i, key)| FlatNode {
                path: "L".repeat(i).parse().unwrap(),
                composite_key: CompositeKey::new(key.to_vec()).unwrap(),
                kind: FlatKind::Leaf(i as u64),
                root_hash: 0,
            })
            .collect()
    }

    #[test]
    fn existing_and_missing_counts() {
        let nodes = flat(&[&[0, 0, 0], &[0, 0, 1], &[0, 0, 2], &[0, 0, 3], &[0, 0, 4], &[0, 0, 9]]);
        let present: HashSet<&CompositeKey> = nodes.iter().map(|n| &n.composite_key).collect();

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let reads = select_reads(&nodes, 4, 1, &mut rng);
            assert!((4..=5).contains(&reads.len()), "seed {seed}: {reads:?}");
            assert!(reads.iter().take(4).all(|key| present.contains(key)));
        }
    }

    #[test]
    fn missing_probe_increments_the_last_component() {
        let nodes = flat(&[&[3, 1, 7]]);
        let mut rng = StdRng::seed_from_u64(7);
        let reads = select_reads(&nodes, 0, 1, &mut rng);
        let expected: Vec<&[u64]> = vec![&[3, 1, 8]];
        assert_eq!(
            reads.iter().map(CompositeKey::components).collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn probes_already_present_are_dropped() {
        let nodes = flat(&[&[0, 0, 1]]);
        let mut rng = StdRng::seed_from_u64(1);
        let reads = select_reads(&nodes, 1, 5, &mut rng);
        assert_eq!(reads.len(), 2);

        let nodes = flat(&[&[0, 0, 1], &[0, 0, 2]]);
        let reads = select_reads(&nodes, 2, 10, &mut rng);
        // (0,0,2) is drawn as existing, so only (0,0,3) can be added
        assert!((2..=3).contains(&reads.len()));
        assert!(reads.iter().all(|key| key.components()[2] <= 3));
    }

    #[test]
    fn existing_draws_never_repeat() {
        let nodes = flat(&[&[0, 0, 0], &[0, 0, 1], &[0, 0, 2], &[0, 0, 3]]);
        for seed in 0..100 {
            let reads = select_reads(&nodes, 4, 0, &mut StdRng::seed_from_u64(seed));
            assert_eq!(reads.len(), 4, "seed {seed}");
        }
    }

    #[test]
    fn existing_draws_are_clamped() {
        let nodes = flat(&[&[1], &[2]]);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(select_reads(&nodes, 10, 0, &mut rng).len(), 2);
        assert!(select_reads(&[], 4, 1, &mut rng).is_empty());
    }

    #[test]
    fn same_seed_same_reads() {
        let nodes = flat(&[&[0, 0, 0], &[0, 0, 1], &[0, 0, 2], &[0, 0, 3], &[0, 0, 4]]);
        let first = select_reads(&nodes, 3, 2, &mut StdRng::seed_from_u64(42));
        let second = select_reads(&nodes, 3, 2, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
