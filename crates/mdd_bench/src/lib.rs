//! Fixtures shared by the filter benchmarks.

use rand::Rng;

/// `n` random lowercase MD5-shaped hex strings.
pub fn random_digests(n: usize) -> Vec<String> {
    let mut rng = rand::rng();
    (0..n).map(|_| format!("{:032x}", rng.random::<u128>())).collect()
}
