//! Goodness-of-fit checks for uniform sampling from `RandomSamplingMap`.
//!
//! Draws are seeded, so these are deterministic; the thresholds are the
//! 0.1% critical values of the chi-squared distribution.

use std::collections::HashMap;

use gaussian_lsh::RandomSamplingMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Chi-squared statistic of observed counts against a uniform expectation.
fn chi_squared(counts: &HashMap<u32, usize>, keys: usize, draws: usize) -> f64 {
    let expected = draws as f64 / keys as f64;
    let observed: f64 = counts
        .values()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum();
    // Keys never drawn contribute `expected` each.
    let missing = keys - counts.len();
    observed + missing as f64 * expected
}

/// Map with keys 0..20 after removing every third key.
fn churned_map() -> RandomSamplingMap<u32, u32> {
    let mut map = RandomSamplingMap::new();
    for k in 0..20 {
        map.insert(k, k);
    }
    for k in (0..20).step_by(3) {
        map.remove(&k);
    }
    map
}

#[test]
fn random_key_is_uniform_after_churn() {
    let map = churned_map();
    assert_eq!(map.len(), 13);

    let mut rng = StdRng::seed_from_u64(1234);
    let draws = 26_000;
    let mut counts = HashMap::new();
    for _ in 0..draws {
        let key = *map.random_key(&mut rng).unwrap();
        assert!(key % 3 != 0, "removed key {key} was sampled");
        *counts.entry(key).or_insert(0) += 1;
    }

    // 12 degrees of freedom.
    let stat = chi_squared(&counts, map.len(), draws);
    assert!(stat < 32.91, "chi-squared {stat:.2} too large");
}

#[test]
fn sample_without_replacement_is_uniform() {
    let map = churned_map();
    let mut rng = StdRng::seed_from_u64(99);
    let rounds = 4_000;
    let per_round = 3;
    let mut counts = HashMap::new();
    for _ in 0..rounds {
        let keys: Vec<u32> = map
            .sample_keys(&mut rng, per_round, false)
            .unwrap()
            .copied()
            .collect();
        assert_eq!(keys.len(), per_round);
        for key in keys {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    // Inclusion counts are not independent across a round, but each key is
    // still included with probability 3/13.
    let stat = chi_squared(&counts, map.len(), rounds * per_round);
    assert!(stat < 32.91, "chi-squared {stat:.2} too large");
}

#[test]
fn random_value_matches_key_distribution() {
    let map = churned_map();
    let mut rng = StdRng::seed_from_u64(5);
    let draws = 13_000;
    let mut counts = HashMap::new();
    for _ in 0..draws {
        *counts.entry(*map.random_value(&mut rng).unwrap()).or_insert(0) += 1;
    }
    let stat = chi_squared(&counts, map.len(), draws);
    assert!(stat < 32.91, "chi-squared {stat:.2} too large");
}
