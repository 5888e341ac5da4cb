use super::{
    BruteForceConfig, BruteForceSearch, GeneticConfig, GeneticSearch, LocalSearchConfig,
    Optimizer, RuleRmiObjective, RuleSetRmiObjective, RuleSetSpace, RuleSpace, SearchStrategy,
    TrajectorySearch,
};
use crate::conf::DEFAULT_RNG_SEED;
use crate::error::{Error, Result};
use crate::factory::RuleSetFactory;
use crate::rule_set::RuleSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    Genetic(GeneticConfig),
    LocalSearch(LocalSearchConfig),
    BruteForce(BruteForceConfig),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::Genetic(GeneticConfig::default())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchLevel {
    /// Bits select `(feature, value)` pairs of the seed's conditions.
    #[default]
    Rule,
    /// Bits select seed members.
    RuleSet,
}

/// One optimizer step, as read from JSON:
///
/// ```json
/// {
///   "strategy": { "kind": "local_search", "radius": 2 },
///   "level": "rule",
///   "top_k": 5,
///   "seed": 7,
///   "parsimony_penalty": 0.01
/// }
/// ```
///
/// Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub strategy: StrategyConfig,
    pub level: SearchLevel,
    pub top_k: Option<usize>,
    pub seed: u64,
    pub parsimony_penalty: f64,
    pub population_size: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            level: SearchLevel::default(),
            top_k: None,
            seed: DEFAULT_RNG_SEED,
            parsimony_penalty: 0.0,
            population_size: None,
        }
    }
}

impl OptimizerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.parsimony_penalty >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "parsimony_penalty must be non-negative, got {}",
                self.parsimony_penalty
            )));
        }
        if self.population_size == Some(0) {
            return Err(Error::InvalidConfig(
                "population_size must be at least 1".to_string(),
            ));
        }
        self.build_strategy().map(|_| ())
    }

    pub fn build_strategy(&self) -> Result<Box<dyn SearchStrategy>> {
        Ok(match &self.strategy {
            StrategyConfig::Genetic(config) => Box::new(GeneticSearch::new(config.clone())?),
            StrategyConfig::LocalSearch(config) => Box::new(TrajectorySearch::from_config(config)?),
            StrategyConfig::BruteForce(config) => Box::new(BruteForceSearch::new(*config)?),
        })
    }

    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Builds the optimizer for this level and runs it on `seed`.
    pub fn run(
        &self,
        seed: &RuleSet,
        factory: &RuleSetFactory,
        pool: &ThreadPool,
    ) -> Result<RuleSet> {
        self.validate()?;
        let strategy = self.build_strategy()?;
        let mut rng = self.rng();
        match self.level {
            SearchLevel::Rule => {
                let space = self
                    .population_size
                    .map_or_else(RuleSpace::new, RuleSpace::with_population_size);
                let objective = RuleRmiObjective::new(self.parsimony_penalty);
                let mut optimizer = Optimizer::new(space, objective, strategy, factory.clone());
                if let Some(k) = self.top_k {
                    optimizer = optimizer.with_top_k(k);
                }
                optimizer.optimize(seed, pool, &mut rng)
            }
            SearchLevel::RuleSet => {
                let space = self
                    .population_size
                    .map_or_else(RuleSetSpace::new, RuleSetSpace::with_population_size);
                let objective = RuleSetRmiObjective::new(self.parsimony_penalty);
                let mut optimizer = Optimizer::new(space, objective, strategy, factory.clone());
                if let Some(k) = self.top_k {
                    optimizer = optimizer.with_top_k(k);
                }
                optimizer.optimize(seed, pool, &mut rng)
            }
        }
    }
}
