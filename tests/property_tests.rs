//! Property-based tests for the LSH index and sampling map.
//!
//! These tests verify invariants that should hold for any operation sequence:
//! - Every stored label sits in exactly one bucket per table
//! - Removed labels leave no trace in buckets or results
//! - Upserting the same vector twice changes nothing
//! - Identically seeded indexes evolve identically

use gaussian_lsh::{GaussianLsh, LshParams, RandomSamplingMap, SearchParams};
use proptest::prelude::*;

const RANK: usize = 6;
const TABLES: usize = 4;

fn params(seed: u64) -> LshParams {
    LshParams::default()
        .with_tables(TABLES)
        .with_projections(3)
        .with_window(0.5)
        .with_normalize_inputs(true)
        .with_seed(seed)
}

prop_compose! {
    fn arb_vector()(v in prop::collection::vec(-1.0f32..1.0, RANK)) -> Vec<f32> {
        v
    }
}

#[derive(Debug, Clone)]
enum Op {
    Upsert(u8, Vec<f32>),
    Remove(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..16u8, arb_vector()).prop_map(|(l, v)| Op::Upsert(l, v)),
        1 => (0..16u8).prop_map(Op::Remove),
    ]
}

fn apply(index: &mut GaussianLsh<u8>, op: &Op) {
    match op {
        Op::Upsert(label, v) => {
            index.upsert(*label, v.clone()).unwrap();
        }
        Op::Remove(label) => {
            index.remove(label);
        }
    }
}

/// Sorted `(table, bucket codes, sorted labels)` dump of every bucket.
fn dump(index: &GaussianLsh<u8>) -> Vec<(usize, Vec<i8>, Vec<u8>)> {
    let mut out = Vec::new();
    for t in 0..index.num_tables() {
        for (key, labels) in index.table(t).unwrap().iter() {
            let mut labels: Vec<u8> = labels.iter().copied().collect();
            labels.sort_unstable();
            out.push((t, key.as_slice().to_vec(), labels));
        }
    }
    out.sort();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn every_label_in_one_bucket_per_table(ops in prop::collection::vec(arb_op(), 0..60)) {
        let mut index = GaussianLsh::new(RANK, params(1)).unwrap();
        for op in &ops {
            apply(&mut index, op);
        }
        for label in index.vectors().keys() {
            prop_assert_eq!(index.memberships(label), TABLES);
        }
        let total: usize = (0..TABLES)
            .map(|t| index.table(t).unwrap().num_entries())
            .sum();
        prop_assert_eq!(total, index.len() * TABLES);
    }

    #[test]
    fn removed_label_leaves_no_trace(
        items in prop::collection::vec((0..16u8, arb_vector()), 1..30),
        victim in 0..16u8,
    ) {
        let mut index = GaussianLsh::new(RANK, params(2)).unwrap();
        for (label, v) in &items {
            index.upsert(*label, v.clone()).unwrap();
        }
        let first = items[0].1.clone();
        index.remove(&victim);

        prop_assert_eq!(index.memberships(&victim), 0);
        prop_assert!(!index.contains(&victim));
        let hits = index.query_vector(&first, &SearchParams::default(), &[]).unwrap();
        prop_assert!(hits.iter().all(|(l, _)| *l != victim));
    }

    #[test]
    fn upsert_is_idempotent(
        items in prop::collection::vec((0..16u8, arb_vector()), 1..30),
        query in arb_vector(),
    ) {
        let mut once = GaussianLsh::new(RANK, params(3)).unwrap();
        let mut twice = GaussianLsh::new(RANK, params(3)).unwrap();
        for (label, v) in &items {
            once.upsert(*label, v.clone()).unwrap();
            twice.upsert(*label, v.clone()).unwrap();
            twice.upsert(*label, v.clone()).unwrap();
        }
        prop_assert_eq!(dump(&once), dump(&twice));

        let search = SearchParams::limit(5);
        prop_assert_eq!(
            once.query_vector(&query, &search, &[]).unwrap(),
            twice.query_vector(&query, &search, &[]).unwrap()
        );
    }

    #[test]
    fn same_seed_same_buckets(ops in prop::collection::vec(arb_op(), 0..60)) {
        let mut a = GaussianLsh::new(RANK, params(4)).unwrap();
        let mut b = GaussianLsh::new(RANK, params(4)).unwrap();
        for op in &ops {
            apply(&mut a, op);
            apply(&mut b, op);
        }
        prop_assert_eq!(dump(&a), dump(&b));
    }

    #[test]
    fn results_sorted_and_bounded(
        items in prop::collection::vec((0..32u8, arb_vector()), 0..40),
        query in arb_vector(),
        limit in 0..10usize,
        ensure_limit in any::<bool>(),
    ) {
        let mut index = GaussianLsh::new(RANK, params(5)).unwrap();
        for (label, v) in &items {
            index.upsert(*label, v.clone()).unwrap();
        }
        let search = SearchParams::limit(limit).with_ensure_limit(ensure_limit);
        let hits = index.query_vector(&query, &search, &[]).unwrap();

        prop_assert!(hits.len() <= limit);
        if ensure_limit && query.iter().any(|x| *x != 0.0) {
            prop_assert_eq!(hits.len(), limit.min(index.len()));
        }
        prop_assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
        let mut labels: Vec<u8> = hits.iter().map(|(l, _)| *l).collect();
        labels.sort_unstable();
        labels.dedup();
        prop_assert_eq!(labels.len(), hits.len());
    }

    #[test]
    fn sampling_map_ids_stay_dense(
        ops in prop::collection::vec((any::<bool>(), 0..64u16), 0..300),
    ) {
        let mut map = RandomSamplingMap::new();
        for (insert, key) in ops {
            if insert {
                map.insert(key, ());
            } else {
                map.remove(&key);
            }
        }
        for id in 0..map.len() {
            let key = map.key_at(id).unwrap();
            prop_assert_eq!(map.id_of(key), Some(id));
        }
        prop_assert!(map.key_at(map.len()).is_none());
    }
}
