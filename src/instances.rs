//! Seeded random instance generators for tests, benchmarks and demos.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::matrix::CostMatrix;

/// Side length of the square the random points are drawn from.
const GRID: f64 = 100.0;

/// `n` uniform points in a 100×100 square with Euclidean (symmetric) costs.
pub fn random_euclidean(n: usize, seed: u64) -> Result<CostMatrix> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.gen_range(0.0..GRID), rng.gen_range(0.0..GRID)))
        .collect();
    CostMatrix::from_points(&points)
}

/// Integer costs in `1..=100` drawn independently for each direction.
pub fn random_asymmetric(n: usize, seed: u64) -> Result<CostMatrix> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        rng.gen_range(1..=100) as f64
                    }
                })
                .collect()
        })
        .collect();
    CostMatrix::from_dense(&rows)
}
