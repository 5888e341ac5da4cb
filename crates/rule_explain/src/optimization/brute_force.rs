use super::{rank, BitVector, Fitness, Scored, SearchContext, SearchStrategy};
use crate::error::{Error, Result};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BruteForceConfig {
    /// Largest Hamming weight enumerated; the vector length when unset.
    pub max_weight: Option<usize>,
    /// Number of vectors generated before enumeration stops.
    pub budget: usize,
    pub top_k: Option<usize>,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            max_weight: None,
            budget: 10_000,
            top_k: None,
        }
    }
}

/// Enumerates vectors by non-decreasing Hamming weight, starting with the
/// all-false vector, and scores every one of them. The starting population
/// is ignored.
#[derive(Clone, Copy, Debug)]
pub struct BruteForceSearch {
    config: BruteForceConfig,
}

impl BruteForceSearch {
    pub fn new(config: BruteForceConfig) -> Result<Self> {
        if config.budget == 0 {
            return Err(Error::InvalidConfig(
                "brute force budget must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &BruteForceConfig {
        &self.config
    }

    pub fn enumerate(&self, length: usize) -> Vec<BitVector> {
        let max_weight = self.config.max_weight.unwrap_or(length).min(length);
        (0..=max_weight)
            .flat_map(|weight| (0..length).combinations(weight))
            .take(self.config.budget)
            .map(|positions| {
                let mut bits = vec![false; length];
                for i in positions {
                    bits[i] = true;
                }
                bits
            })
            .collect()
    }
}

impl SearchStrategy for BruteForceSearch {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn search(
        &self,
        _population: Vec<BitVector>,
        length: usize,
        fitness: &Fitness<'_>,
        ctx: &mut SearchContext<'_>,
    ) -> Vec<Scored> {
        let candidates = self.enumerate(length);
        let generated = candidates.len();
        let mut scored: Vec<Scored> = ctx.pool.install(|| {
            candidates
                .into_par_iter()
                .map(|bits| {
                    let score = fitness(&bits);
                    Scored::new(bits, score)
                })
                .collect()
        });
        rank(&mut scored);
        if let Some(k) = self.config.top_k {
            scored.truncate(k);
        }
        info!(length, generated, kept = scored.len(), "brute force finished");
        scored
    }
}
