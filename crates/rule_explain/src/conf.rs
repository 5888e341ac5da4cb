/// Value recorded for missing cells when a dataframe column is dictionary-encoded.
pub const NULL_VALUE: &str = "None";

// Cache capacities (entries per metric, per label for label-dependent metrics)
pub const DEFAULT_COVERED_CACHE_SIZE: usize = 10_000;
pub const DEFAULT_CORRECTLY_COVERED_CACHE_SIZE: usize = 10_000;
pub const DEFAULT_INCORRECTLY_NOT_COVERED_CACHE_SIZE: usize = 10_000;
// Dense bitsets that the minimal cover never needs: kept at a single entry.
pub const DEFAULT_INCORRECTLY_COVERED_CACHE_SIZE: usize = 1;
pub const DEFAULT_CORRECTLY_NOT_COVERED_CACHE_SIZE: usize = 1;

// Genetic algorithm defaults
pub const DEFAULT_OFFSPRING_FRACTION: f64 = 0.6;
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;
pub const DEFAULT_RANK_PRESSURE: f64 = 0.5;
pub const DEFAULT_STEADY_GENERATIONS: usize = 10;
pub const DEFAULT_CONVERGENCE_EPSILON: f64 = 1e-4;
pub const DEFAULT_MAX_GENERATIONS: usize = 100;

pub const DEFAULT_RNG_SEED: u64 = 42;
