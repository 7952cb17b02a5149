use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// table of random 64-bit constants for incremental XOR hashing.
/// the hash of a position is the XOR of the constants of its atomic
/// elements, so local mutations update the hash in O(1).
///
/// tables are built from an explicit seed, never from process
/// entropy, so that every worker of a run agrees on every hash.
pub struct Zobrist(Vec<u64>);

impl Zobrist {
    pub fn new(elements: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self((0..elements).map(|_| rng.next_u64()).collect())
    }

    pub fn constant(&self, element: usize) -> u64 {
        self.0[element]
    }
}
