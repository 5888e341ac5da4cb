use super::BitVector;
use rand::rngs::StdRng;
use rand::Rng;

/// Produces the initial population from the seed's encoding.
pub trait Initializer: Send + Sync {
    fn initialize(
        &self,
        seed_vectors: &[BitVector],
        length: usize,
        size: usize,
        rng: &mut StdRng,
    ) -> Vec<BitVector>;
}

/// Cycles through the seed vectors until the population is full. An empty
/// seed yields all-false vectors.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeededInitializer;

impl Initializer for SeededInitializer {
    fn initialize(
        &self,
        seed_vectors: &[BitVector],
        length: usize,
        size: usize,
        _rng: &mut StdRng,
    ) -> Vec<BitVector> {
        if seed_vectors.is_empty() {
            return vec![vec![false; length]; size];
        }
        (0..size)
            .map(|i| {
                let mut bits = seed_vectors[i % seed_vectors.len()].clone();
                bits.resize(length, false);
                bits
            })
            .collect()
    }
}

/// Independent Bernoulli bits with probability `density`.
#[derive(Clone, Copy, Debug)]
pub struct RandomInitializer {
    density: f64,
}

impl RandomInitializer {
    pub fn new(density: f64) -> Self {
        Self {
            density: density.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomInitializer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Initializer for RandomInitializer {
    fn initialize(
        &self,
        _seed_vectors: &[BitVector],
        length: usize,
        size: usize,
        rng: &mut StdRng,
    ) -> Vec<BitVector> {
        (0..size)
            .map(|_| (0..length).map(|_| rng.random_bool(self.density)).collect())
            .collect()
    }
}
