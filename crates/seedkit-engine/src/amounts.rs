use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MIN_CENTS: u64 = 100;
const MAX_CENTS: u64 = 100_000;

/// Picks operation amounts between 1.00 and 1000.00.
///
/// With a seed, the amount depends only on the seed and the item key, so the
/// same plan always issues the same amounts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AmountSource {
    seed: Option<u64>,
}

impl AmountSource {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    pub(crate) fn amount_for(&self, key: &str) -> f64 {
        let cents = match self.seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(seed, key));
                rng.random_range(MIN_CENTS..=MAX_CENTS)
            }
            None => rand::rng().random_range(MIN_CENTS..=MAX_CENTS),
        };
        cents as f64 / 100.0
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
