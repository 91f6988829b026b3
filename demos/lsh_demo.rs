//! Gaussian LSH demo
//!
//! Indexes a clustered dataset, compares LSH answers with an exact scan, and
//! shows how the table count trades memory for recall.
//!
//! ```bash
//! RUST_LOG=gaussian_lsh=debug cargo run --example lsh_demo
//! ```

use gaussian_lsh::ann::graph::mean_recall;
use gaussian_lsh::{GaussianLsh, LinearIndex, LshParams, NeighborIndex, SearchParams};
use rand::prelude::*;
use tracing_subscriber::EnvFilter;

const DIM: usize = 32;

fn main() -> gaussian_lsh::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Gaussian LSH");
    println!("============\n");

    let (data, queries) = clustered(5_000, 50, 20, 7);
    let mut exact: LinearIndex<u32> = LinearIndex::with_capacity(DIM, data.len());
    exact.upsert_many(labeled(&data))?;

    demo_query(&data, &exact)?;
    demo_tradeoffs(&data, &queries, &exact)?;
    Ok(())
}

fn demo_query(data: &[Vec<f32>], exact: &LinearIndex<u32>) -> gaussian_lsh::Result<()> {
    println!("1. One query, two indexes");
    println!("   ----------------------");

    let mut lsh: GaussianLsh<u32> = GaussianLsh::new(DIM, params(15))?;
    lsh.insert_many(labeled(data))?;

    let search = SearchParams::limit(5);
    let approx = lsh.query_label(&0, &search, true)?;
    let truth = exact.query_label(&0, &search, true)?;

    println!("   neighbors of item 0:");
    println!("     {:>8}  {:>10}    {:>8}  {:>10}", "lsh", "sim", "exact", "sim");
    for i in 0..search.limit.unwrap_or(0) {
        let cell = |hits: &[(u32, f32)]| match hits.get(i) {
            Some((l, s)) => format!("{l:>8}  {s:>10.4}"),
            None => format!("{:>8}  {:>10}", "-", "-"),
        };
        println!("     {}    {}", cell(&approx[..]), cell(&truth[..]));
    }

    let stats = lsh.stats();
    println!(
        "\n   {} tables, {} buckets, largest {}, mean {:.1} items/bucket\n",
        lsh.num_tables(),
        stats.num_buckets,
        stats.largest_bucket,
        stats.mean_bucket_size
    );
    Ok(())
}

fn demo_tradeoffs(
    data: &[Vec<f32>],
    queries: &[Vec<f32>],
    exact: &LinearIndex<u32>,
) -> gaussian_lsh::Result<()> {
    println!("2. Tables vs recall@10");
    println!("   -------------------");
    println!("   More tables: more chances for a true neighbor to collide.");
    println!("   Each table stores every label once more.\n");
    println!("   tables | buckets | recall@10");
    println!("   -------|---------|----------");

    for tables in [1, 2, 5, 10, 20] {
        let mut lsh: GaussianLsh<u32> = GaussianLsh::new(DIM, params(tables))?;
        lsh.insert_many(labeled(data))?;
        let recall = mean_recall(&lsh, exact, queries, 10)?;
        println!(
            "   {:>6} | {:>7} | {:.3}",
            tables,
            lsh.stats().num_buckets,
            recall
        );
    }
    Ok(())
}

fn params(tables: usize) -> LshParams {
    LshParams::default()
        .with_tables(tables)
        .with_projections(8)
        .with_window(0.5)
        .with_normalize_inputs(true)
        .with_seed(42)
}

fn labeled(data: &[Vec<f32>]) -> impl Iterator<Item = (u32, Vec<f32>)> + '_ {
    data.iter().cloned().enumerate().map(|(i, v)| (i as u32, v))
}

/// `n` points and `n_queries` queries around `clusters` random centers.
fn clustered(
    n: usize,
    clusters: usize,
    n_queries: usize,
    seed: u64,
) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<Vec<f32>> = (0..clusters)
        .map(|_| (0..DIM).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect())
        .collect();
    let point = |rng: &mut StdRng| -> Vec<f32> {
        let center = &centers[rng.random_range(0..clusters)];
        center
            .iter()
            .map(|c| c + (rng.random::<f32>() - 0.5) * 0.3)
            .collect()
    };
    let data = (0..n).map(|_| point(&mut rng)).collect();
    let queries = (0..n_queries).map(|_| point(&mut rng)).collect();
    (data, queries)
}
