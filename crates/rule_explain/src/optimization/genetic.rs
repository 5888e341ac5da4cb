use super::{rank, rank_order, BitVector, Fitness, Scored, SearchContext, SearchStrategy};
use crate::conf::{
    DEFAULT_CONVERGENCE_EPSILON, DEFAULT_MAX_GENERATIONS, DEFAULT_OFFSPRING_FRACTION,
    DEFAULT_RANK_PRESSURE, DEFAULT_STEADY_GENERATIONS, DEFAULT_TOURNAMENT_SIZE,
};
use crate::error::{Error, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Share of each generation produced by crossover and mutation; the rest
    /// are survivors carried over by rank selection.
    pub offspring_fraction: f64,
    pub tournament_size: usize,
    /// 0 selects survivors uniformly; larger values favour better ranks.
    pub rank_pressure: f64,
    pub steady_generations: usize,
    pub convergence_epsilon: f64,
    pub max_generations: usize,
    /// Per-bit flip probability; `2 / length` when unset.
    pub mutation_probability: Option<f64>,
    /// Per-bit swap probability of uniform crossover; `2 / length` when unset.
    pub swap_probability: Option<f64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            offspring_fraction: DEFAULT_OFFSPRING_FRACTION,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            rank_pressure: DEFAULT_RANK_PRESSURE,
            steady_generations: DEFAULT_STEADY_GENERATIONS,
            convergence_epsilon: DEFAULT_CONVERGENCE_EPSILON,
            max_generations: DEFAULT_MAX_GENERATIONS,
            mutation_probability: None,
            swap_probability: None,
        }
    }
}

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

impl GeneticConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_probability(self.offspring_fraction) {
            return Err(Error::InvalidConfig(format!(
                "offspring_fraction must lie in [0, 1], got {}",
                self.offspring_fraction
            )));
        }
        if self.tournament_size == 0 {
            return Err(Error::InvalidConfig(
                "tournament_size must be at least 1".to_string(),
            ));
        }
        if self.max_generations == 0 || self.steady_generations == 0 {
            return Err(Error::InvalidConfig(
                "max_generations and steady_generations must be at least 1".to_string(),
            ));
        }
        if !(self.rank_pressure >= 0.0 && self.convergence_epsilon >= 0.0) {
            return Err(Error::InvalidConfig(
                "rank_pressure and convergence_epsilon must be non-negative".to_string(),
            ));
        }
        for p in [self.mutation_probability, self.swap_probability]
            .into_iter()
            .flatten()
        {
            if !is_probability(p) {
                return Err(Error::InvalidConfig(format!(
                    "probabilities must lie in [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }

    fn per_bit(explicit: Option<f64>, length: usize) -> f64 {
        explicit.unwrap_or_else(|| (2.0 / length.max(1) as f64).min(1.0))
    }
}

/// Generational genetic algorithm over bit vectors.
///
/// Each generation is `offspring_fraction` children (tournament-selected
/// parents, uniform crossover, bit-flip mutation), at least one when the
/// fraction is positive, plus survivors drawn by linear-rank selection. The
/// previous best always competes with the children, and the best `size`
/// individuals form the next generation. Fitness is memoized per genotype for
/// the whole run.
///
/// The run stops on a fitness plateau, at the generation cap, or when the
/// population has converged. Convergence is measured on fitness rather than
/// genotypes: the population counts as converged once the spread between its
/// best and mean score is within `convergence_epsilon`. A population of one
/// never converges this way and runs until the plateau or the cap.
#[derive(Clone, Debug)]
pub struct GeneticSearch {
    config: GeneticConfig,
}

impl GeneticSearch {
    pub fn new(config: GeneticConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    fn tournament<'p>(&self, ranked: &'p [Scored], rng: &mut StdRng) -> &'p Scored {
        let mut winner = &ranked[rng.random_range(0..ranked.len())];
        for _ in 1..self.config.tournament_size {
            let challenger = &ranked[rng.random_range(0..ranked.len())];
            if rank_order(challenger, winner).is_lt() {
                winner = challenger;
            }
        }
        winner
    }

    fn crossover(
        a: &[bool],
        b: &[bool],
        swap_probability: f64,
        rng: &mut StdRng,
    ) -> (BitVector, BitVector) {
        let mut left = a.to_vec();
        let mut right = b.to_vec();
        for i in 0..left.len() {
            if rng.random_bool(swap_probability) {
                std::mem::swap(&mut left[i], &mut right[i]);
            }
        }
        (left, right)
    }

    fn mutate(bits: &mut [bool], mutation_probability: f64, rng: &mut StdRng) {
        for bit in bits.iter_mut() {
            if rng.random_bool(mutation_probability) {
                *bit = !*bit;
            }
        }
    }

    /// Linear-rank sampling with replacement; `ranked` must be best first.
    fn survivors(&self, ranked: &[Scored], count: usize, rng: &mut StdRng) -> Vec<BitVector> {
        if count == 0 {
            return Vec::new();
        }
        let n = ranked.len();
        let weights = (0..n).map(|i| 1.0 + self.config.rank_pressure * (n - 1 - i) as f64);
        let mut out = vec![ranked[0].bits.clone()];
        match WeightedIndex::new(weights) {
            Ok(dist) => {
                while out.len() < count {
                    out.push(ranked[dist.sample(rng)].bits.clone());
                }
            }
            Err(_) => out.resize(count, ranked[0].bits.clone()),
        }
        out
    }
}

/// Scores the genotypes missing from `memo`, in parallel, and returns the
/// population scored and ranked.
fn evaluate(
    population: &[BitVector],
    memo: &mut HashMap<BitVector, f64>,
    fitness: &Fitness<'_>,
    ctx: &SearchContext<'_>,
) -> Vec<Scored> {
    let mut pending = HashSet::new();
    let fresh: Vec<&BitVector> = population
        .iter()
        .filter(|bits| !memo.contains_key(*bits) && pending.insert(*bits))
        .collect();
    let scores: Vec<f64> = ctx
        .pool
        .install(|| fresh.par_iter().map(|bits| fitness(bits)).collect());
    for (bits, score) in fresh.into_iter().zip(scores) {
        memo.insert(bits.clone(), score);
    }

    let mut scored: Vec<Scored> = population
        .iter()
        .map(|bits| Scored::new(bits.clone(), memo[bits]))
        .collect();
    rank(&mut scored);
    scored
}

fn mean_score(ranked: &[Scored]) -> f64 {
    ranked.iter().map(|s| s.score).sum::<f64>() / ranked.len() as f64
}

impl SearchStrategy for GeneticSearch {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn search(
        &self,
        population: Vec<BitVector>,
        length: usize,
        fitness: &Fitness<'_>,
        ctx: &mut SearchContext<'_>,
    ) -> Vec<Scored> {
        if population.is_empty() {
            return Vec::new();
        }
        let size = population.len();
        let mutation_probability = GeneticConfig::per_bit(self.config.mutation_probability, length);
        let swap_probability = GeneticConfig::per_bit(self.config.swap_probability, length);
        let mut offspring_count = (self.config.offspring_fraction * size as f64).round() as usize;
        if self.config.offspring_fraction > 0.0 {
            offspring_count = offspring_count.max(1);
        }
        let offspring_count = offspring_count.min(size);
        // The elite is always carried, so a generation may hold size + 1
        let survivor_count = (size - offspring_count).max(1);

        let mut memo: HashMap<BitVector, f64> = HashMap::new();
        let mut ranked = evaluate(&population, &mut memo, fitness, ctx);
        let mut best = ranked[0].score;
        let mut steady = 0;
        let mut generation = 0;

        while generation < self.config.max_generations {
            generation += 1;

            let mut next: Vec<BitVector> = Vec::with_capacity(size);
            while next.len() < offspring_count {
                let a = self.tournament(&ranked, ctx.rng).bits.clone();
                let b = self.tournament(&ranked, ctx.rng).bits.clone();
                let (mut left, mut right) = Self::crossover(&a, &b, swap_probability, ctx.rng);
                Self::mutate(&mut left, mutation_probability, ctx.rng);
                Self::mutate(&mut right, mutation_probability, ctx.rng);
                next.push(left);
                if next.len() < offspring_count {
                    next.push(right);
                }
            }
            next.extend(self.survivors(&ranked, survivor_count, ctx.rng));

            ranked = evaluate(&next, &mut memo, fitness, ctx);
            ranked.truncate(size);
            let generation_best = ranked[0].score;
            let mean = mean_score(&ranked);
            debug!(generation, best = generation_best, mean, "generation evaluated");

            if generation_best > best + self.config.convergence_epsilon {
                best = generation_best;
                steady = 0;
            } else {
                best = best.max(generation_best);
                steady += 1;
            }

            if steady >= self.config.steady_generations {
                info!(generation, best, "fitness plateau reached");
                break;
            }
            if size > 1 && (generation_best - mean).abs() <= self.config.convergence_epsilon {
                info!(generation, best, "population converged");
                break;
            }
        }

        info!(
            generation,
            evaluations = memo.len(),
            best = ranked[0].score,
            "genetic search finished"
        );
        ranked
    }
}
