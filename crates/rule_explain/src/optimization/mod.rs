//! Combinatorial search over rules and rule sets.
//!
//! ## Template
//!
//! ```text
//! seed RuleSet ─► SearchSpace hooks ─► length, population size
//!              ─► bind translator ──► seed encoding ─► Initializer ─► population
//!              ─► bind objective
//!              ─► SearchStrategy::search(population, translate ∘ evaluate)
//!              ─► translator.fold(top-K) ─► RuleSet
//! ```
//!
//! Candidates are bit vectors. At rule level bit `i` selects the `i`-th
//! distinct `(feature, value)` pair of the seed; at rule-set level it selects
//! the `i`-th seed member. Enumeration orders are fixed once per seed.
//!
//! ## Strategies
//!
//! | Strategy              | Behaviour                                         |
//! |-----------------------|---------------------------------------------------|
//! | [`GeneticSearch`]     | tournament/rank selection, uniform crossover      |
//! | [`TrajectorySearch`]  | best-improvement climb to a k-optimal vector      |
//! | [`BruteForceSearch`]  | all vectors by Hamming weight, within a budget    |
//!
//! ## Ranking
//!
//! Scored vectors are ranked by descending score; equal scores order by the
//! bit vector itself (`false < true`, lexicographic), so every strategy is
//! deterministic for a fixed rng seed.

mod brute_force;
mod config;
mod genetic;
mod initializer;
mod local_search;
mod objective;
mod space;

pub use brute_force::{BruteForceConfig, BruteForceSearch};
pub use config::{OptimizerConfig, SearchLevel, StrategyConfig};
pub use genetic::{GeneticConfig, GeneticSearch};
pub use initializer::{Initializer, RandomInitializer, SeededInitializer};
pub use local_search::{LocalSearchConfig, TrajectorySearch};
pub use objective::{ObjectiveFunction, RuleRmiObjective, RuleSetRmiObjective};
pub use space::{ConditionTranslator, MemberTranslator, RuleSetSpace, RuleSpace};

use crate::error::Result;
use crate::factory::RuleSetFactory;
use crate::rule_set::RuleSet;
use rand::rngs::StdRng;
use rayon::ThreadPool;
use std::cmp::Ordering;
use tracing::{info, instrument, warn};

pub type BitVector = Vec<bool>;

/// Fitness of a candidate vector: translation followed by the objective.
pub type Fitness<'a> = dyn Fn(&[bool]) -> f64 + Sync + 'a;

#[derive(Clone, Debug, PartialEq)]
pub struct Scored {
    pub bits: BitVector,
    pub score: f64,
}

impl Scored {
    pub fn new(bits: BitVector, score: f64) -> Self {
        Self { bits, score }
    }

    pub fn weight(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Best first; ties broken by the bit vector.
pub fn rank_order(a: &Scored, b: &Scored) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.bits.cmp(&b.bits))
}

pub fn rank(scored: &mut [Scored]) {
    scored.sort_by(rank_order);
}

/// Resources handed to a strategy for one run.
pub struct SearchContext<'a> {
    pub pool: &'a ThreadPool,
    pub rng: &'a mut StdRng,
}

pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Searches from `population` (vectors of `length` bits) and returns the
    /// final scored vectors, ranked.
    fn search(
        &self,
        population: Vec<BitVector>,
        length: usize,
        fitness: &Fitness<'_>,
        ctx: &mut SearchContext<'_>,
    ) -> Vec<Scored>;
}

/// Maps bit vectors to candidates for one seed, and folds results back.
pub trait RepresentationTranslator: Send + Sync {
    type Candidate;

    fn length(&self) -> usize;

    /// The seed itself, encoded.
    fn seed_vectors(&self) -> Vec<BitVector>;

    fn translate(&self, bits: &[bool]) -> Result<Self::Candidate>;

    /// Builds the optimized rule set from ranked vectors.
    fn fold(&self, ranked: &[Scored]) -> Result<RuleSet>;
}

/// Search-level hooks: how a seed turns into a representation space.
pub trait SearchSpace: Send + Sync {
    type Candidate;
    type Translator: RepresentationTranslator<Candidate = Self::Candidate>;

    fn representation_length(&self, seed: &RuleSet) -> usize;

    fn population_size(&self, seed: &RuleSet) -> usize;

    fn bind(&self, seed: &RuleSet, factory: &RuleSetFactory) -> Result<Self::Translator>;
}

pub struct Optimizer<S, O> {
    space: S,
    objective: O,
    initializer: Box<dyn Initializer>,
    strategy: Box<dyn SearchStrategy>,
    factory: RuleSetFactory,
    top_k: Option<usize>,
}

impl<S, O> Optimizer<S, O>
where
    S: SearchSpace,
    O: ObjectiveFunction<S::Candidate> + Clone,
{
    pub fn new(
        space: S,
        objective: O,
        strategy: Box<dyn SearchStrategy>,
        factory: RuleSetFactory,
    ) -> Self {
        Self {
            space,
            objective,
            initializer: Box::new(SeededInitializer),
            strategy,
            factory,
            top_k: None,
        }
    }

    pub fn with_initializer(mut self, initializer: Box<dyn Initializer>) -> Self {
        self.initializer = initializer;
        self
    }

    /// Keep only the `k` best vectors when folding the result.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn factory(&self) -> &RuleSetFactory {
        &self.factory
    }

    #[instrument(skip_all, fields(strategy = self.strategy.name(), seed_rules = seed.len()))]
    pub fn optimize(&self, seed: &RuleSet, pool: &ThreadPool, rng: &mut StdRng) -> Result<RuleSet> {
        let length = self.space.representation_length(seed);
        let size = self.space.population_size(seed);

        let translator = self.space.bind(seed, &self.factory)?;
        let population = self
            .initializer
            .initialize(&translator.seed_vectors(), length, size, rng);

        let mut objective = self.objective.clone();
        objective.initialize(seed)?;

        let fitness = |bits: &[bool]| -> f64 {
            let score = translator
                .translate(bits)
                .and_then(|candidate| objective.evaluate(&candidate));
            match score {
                Ok(score) if !score.is_nan() => score,
                Ok(_) => f64::NEG_INFINITY,
                Err(e) => {
                    warn!(error = %e, "candidate evaluation failed");
                    f64::NEG_INFINITY
                }
            }
        };

        let mut ctx = SearchContext { pool, rng };
        let ranked = self.strategy.search(population, length, &fitness, &mut ctx);
        let kept = match self.top_k {
            Some(k) => &ranked[..k.min(ranked.len())],
            None => &ranked[..],
        };
        info!(
            length,
            population = size,
            best = ?ranked.first().map(|s| s.score),
            kept = kept.len(),
            "optimization finished"
        );
        translator.fold(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_rank_by_bits() {
        let mut scored = vec![
            Scored::new(vec![true, false], 1.0),
            Scored::new(vec![false, true], 1.0),
            Scored::new(vec![true, true], 2.0),
            Scored::new(vec![false, false], f64::NEG_INFINITY),
        ];
        rank(&mut scored);
        let bits: Vec<BitVector> = scored.into_iter().map(|s| s.bits).collect();
        assert_eq!(
            bits,
            vec![
                vec![true, true],
                vec![false, true],
                vec![true, false],
                vec![false, false]
            ]
        );
    }
}
