//! Parallel queries and serialized writes through `SharedIndex`.

use gaussian_lsh::{GaussianLsh, LshParams, SearchParams, SharedIndex, UpdateBatch};

fn vector(seed: u32) -> Vec<f32> {
    (0..8).map(|i| ((seed * 8 + i) as f32 * 0.13).sin()).collect()
}

fn shared() -> SharedIndex<GaussianLsh<u32>> {
    let params = LshParams::default()
        .with_tables(8)
        .with_projections(4)
        .with_normalize_inputs(true)
        .with_seed(77);
    SharedIndex::new(GaussianLsh::new(8, params).unwrap())
}

#[test]
fn parallel_readers_see_a_stable_index() {
    let index = shared();
    for i in 0..200 {
        index.upsert(i, vector(i)).unwrap();
    }

    std::thread::scope(|s| {
        for t in 0..4u32 {
            let index = index.clone();
            s.spawn(move || {
                for i in (t..200).step_by(4) {
                    let hits = index
                        .query_label(&i, &SearchParams::default(), false)
                        .unwrap();
                    assert_eq!(hits[0].0, i);
                }
            });
        }
    });
}

#[test]
fn concurrent_writers_and_readers_keep_invariants() {
    let index = shared();

    std::thread::scope(|s| {
        for t in 0..4u32 {
            let index = index.clone();
            s.spawn(move || {
                for i in 0..100 {
                    let label = t * 1000 + i;
                    index.upsert(label, vector(label)).unwrap();
                    if i % 3 == 0 {
                        assert!(index.remove(&label));
                    }
                }
            });
        }
        for _ in 0..2 {
            let index = index.clone();
            s.spawn(move || {
                let search = SearchParams::limit(10).with_ensure_limit(true);
                for i in 0..100 {
                    let hits = index.query_vector(&vector(i), &search, &[]).unwrap();
                    assert!(hits.len() <= 10);
                    assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
                }
            });
        }
    });

    // 100 per writer minus the 34 removed.
    assert_eq!(index.len(), 4 * 66);
    let guard = index.read();
    for label in guard.vectors().keys() {
        assert_eq!(guard.memberships(label), guard.num_tables());
    }
}

#[test]
fn batches_apply_atomically_to_readers() {
    let index = shared();
    let mut batch = UpdateBatch::new();
    for i in 0..50 {
        batch.upsert(i, vector(i));
    }

    std::thread::scope(|s| {
        let writer = index.clone();
        s.spawn(move || writer.apply(batch).unwrap());
        let reader = index.clone();
        s.spawn(move || {
            for _ in 0..20 {
                let n = reader.len();
                assert!(n == 0 || n == 50, "saw partial batch of {n}");
            }
        });
    });
    assert_eq!(index.len(), 50);
}
