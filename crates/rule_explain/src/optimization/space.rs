use super::{BitVector, RepresentationTranslator, Scored, SearchSpace};
use crate::condition::Condition;
use crate::error::Result;
use crate::factory::RuleSetFactory;
use crate::feature::Feature;
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

fn distinct_pairs(seed: &RuleSet) -> Vec<(Feature, u32)> {
    let pairs: BTreeSet<(Feature, u32)> = seed
        .iter()
        .flat_map(|rule| rule.condition().pairs().map(|(f, c)| (f.clone(), c)))
        .collect();
    pairs.into_iter().collect()
}

// ---------------------------
// Rule level
// ---------------------------

/// Rule-level search: one bit per distinct `(feature, value)` pair of the seed.
/// The default population holds one individual per seed rule.
#[derive(Clone, Debug, Default)]
pub struct RuleSpace {
    population_size: Option<usize>,
}

impl RuleSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_population_size(population_size: usize) -> Self {
        Self {
            population_size: Some(population_size),
        }
    }
}

impl SearchSpace for RuleSpace {
    type Candidate = Rule;
    type Translator = ConditionTranslator;

    fn representation_length(&self, seed: &RuleSet) -> usize {
        distinct_pairs(seed).len()
    }

    fn population_size(&self, seed: &RuleSet) -> usize {
        self.population_size.unwrap_or_else(|| seed.len().max(1))
    }

    fn bind(&self, seed: &RuleSet, factory: &RuleSetFactory) -> Result<ConditionTranslator> {
        Ok(ConditionTranslator {
            pairs: distinct_pairs(seed),
            seed: seed.clone(),
            factory: factory.clone(),
        })
    }
}

pub struct ConditionTranslator {
    pairs: Vec<(Feature, u32)>,
    seed: RuleSet,
    factory: RuleSetFactory,
}

impl ConditionTranslator {
    pub fn pairs(&self) -> &[(Feature, u32)] {
        &self.pairs
    }

    pub fn condition(&self, bits: &[bool]) -> Result<Condition> {
        let mut terms: BTreeMap<Feature, BTreeSet<u32>> = BTreeMap::new();
        for ((feature, code), _) in self.pairs.iter().zip(bits).filter(|(_, on)| **on) {
            terms.entry(feature.clone()).or_default().insert(*code);
        }
        Condition::from_terms(terms)
    }

    pub fn encode(&self, condition: &Condition) -> BitVector {
        self.pairs
            .iter()
            .map(|(feature, code)| condition.contains(feature, *code))
            .collect()
    }
}

impl RepresentationTranslator for ConditionTranslator {
    type Candidate = Rule;

    fn length(&self) -> usize {
        self.pairs.len()
    }

    fn seed_vectors(&self) -> Vec<BitVector> {
        self.seed.iter().map(|r| self.encode(r.condition())).collect()
    }

    fn translate(&self, bits: &[bool]) -> Result<Rule> {
        let condition = self.condition(bits)?;
        self.factory
            .rule_factory()
            .initialize(condition, self.seed.label().clone())
    }

    /// Union of the distinct, non-empty translated rules.
    fn fold(&self, ranked: &[Scored]) -> Result<RuleSet> {
        let mut seen: HashSet<&BitVector> = HashSet::new();
        let mut result = self.factory.new_empty(self.seed.label().clone());
        for scored in ranked {
            if scored.weight() == 0 || !seen.insert(&scored.bits) {
                continue;
            }
            let rule = self.translate(&scored.bits)?;
            debug!(rule = %rule, score = scored.score, "folding rule");
            result = self.factory.new_copy_with(&result, rule)?;
        }
        Ok(result)
    }
}

// ---------------------------
// Rule-set level
// ---------------------------

/// Set-level search: one bit per seed member; the best vector is the result.
#[derive(Clone, Debug, Default)]
pub struct RuleSetSpace {
    population_size: Option<usize>,
}

impl RuleSetSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_population_size(population_size: usize) -> Self {
        Self {
            population_size: Some(population_size),
        }
    }
}

impl SearchSpace for RuleSetSpace {
    type Candidate = RuleSet;
    type Translator = MemberTranslator;

    fn representation_length(&self, seed: &RuleSet) -> usize {
        seed.len()
    }

    fn population_size(&self, seed: &RuleSet) -> usize {
        self.population_size.unwrap_or_else(|| seed.len().max(1))
    }

    fn bind(&self, seed: &RuleSet, factory: &RuleSetFactory) -> Result<MemberTranslator> {
        Ok(MemberTranslator {
            members: seed.iter().cloned().collect(),
            seed: seed.clone(),
            factory: factory.clone(),
        })
    }
}

pub struct MemberTranslator {
    members: Vec<Rule>,
    seed: RuleSet,
    factory: RuleSetFactory,
}

impl MemberTranslator {
    pub fn members(&self) -> &[Rule] {
        &self.members
    }
}

impl RepresentationTranslator for MemberTranslator {
    type Candidate = RuleSet;

    fn length(&self) -> usize {
        self.members.len()
    }

    fn seed_vectors(&self) -> Vec<BitVector> {
        vec![vec![true; self.members.len()]]
    }

    fn translate(&self, bits: &[bool]) -> Result<RuleSet> {
        let selected = self
            .members
            .iter()
            .zip(bits)
            .filter(|(_, on)| **on)
            .map(|(rule, _)| rule.clone());
        self.factory
            .new_with_collection(self.seed.label().clone(), selected)
    }

    fn fold(&self, ranked: &[Scored]) -> Result<RuleSet> {
        match ranked.first() {
            Some(best) => self.translate(&best.bits),
            None => self.factory.translate_with_data(&self.seed),
        }
    }
}
