//! Factories binding rules and rule sets to one calculator.
//!
//! Every [`Rule`] and [`RuleSet`] is built by a factory and carries the
//! factory's calculator as its source. Moving a rule onto another calculator
//! always goes through `translate_with_data`: statistics are copied when both
//! calculators describe the same dataset and recomputed otherwise.

use crate::calculator::CoverCalculator;
use crate::condition::Condition;
use crate::dataset::DatasetId;
use crate::error::{Error, Result};
use crate::feature::Label;
use crate::rule::{Rule, Statistics};
use crate::rule_set::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::trace;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsPolicy {
    /// Confusion statistics are computed once, when the rule is built
    #[default]
    Eager,
    /// Confusion statistics are recomputed on every accessor call
    Lazy,
}

#[derive(Clone)]
pub struct RuleFactory {
    calculator: Arc<dyn CoverCalculator>,
    policy: StatisticsPolicy,
}

impl RuleFactory {
    pub fn new(calculator: Arc<dyn CoverCalculator>, policy: StatisticsPolicy) -> Self {
        Self { calculator, policy }
    }

    pub fn eager(calculator: Arc<dyn CoverCalculator>) -> Self {
        Self::new(calculator, StatisticsPolicy::Eager)
    }

    pub fn lazy(calculator: Arc<dyn CoverCalculator>) -> Self {
        Self::new(calculator, StatisticsPolicy::Lazy)
    }

    pub fn calculator(&self) -> &Arc<dyn CoverCalculator> {
        &self.calculator
    }

    pub fn policy(&self) -> StatisticsPolicy {
        self.policy
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.calculator.dataset_id()
    }

    fn statistics_for(&self, condition: &Condition, label: &Label) -> Result<Statistics> {
        match self.policy {
            StatisticsPolicy::Eager => Ok(Statistics::Frozen(
                self.calculator.confusion(condition, label)?,
            )),
            StatisticsPolicy::Lazy => Ok(Statistics::Deferred),
        }
    }

    pub fn initialize(&self, condition: Condition, label: Label) -> Result<Rule> {
        let statistics = self.statistics_for(&condition, &label)?;
        Ok(Rule::new(
            condition,
            label,
            statistics,
            Arc::clone(&self.calculator),
        ))
    }

    /// Rebinds `rule` to this factory's calculator.
    pub fn translate_with_data(&self, rule: &Rule) -> Result<Rule> {
        let statistics = if rule.dataset_id() == self.dataset_id() {
            match rule.statistics() {
                frozen @ Statistics::Frozen(_) => frozen,
                Statistics::Deferred => self.statistics_for(rule.condition(), rule.label())?,
            }
        } else {
            trace!(rule = %rule, "recomputing statistics on another dataset");
            self.statistics_for(rule.condition(), rule.label())?
        };
        Ok(Rule::new(
            rule.condition().clone(),
            rule.label().clone(),
            statistics,
            Arc::clone(&self.calculator),
        ))
    }
}

#[derive(Clone)]
pub struct RuleSetFactory {
    rules: RuleFactory,
}

fn check_label(expected: &Label, found: &Label) -> Result<()> {
    if expected != found {
        return Err(Error::IllegalCombination(format!(
            "cannot combine label '{}' with label '{}'",
            expected, found
        )));
    }
    Ok(())
}

impl RuleSetFactory {
    pub fn new(rules: RuleFactory) -> Self {
        Self { rules }
    }

    pub fn rule_factory(&self) -> &RuleFactory {
        &self.rules
    }

    pub fn calculator(&self) -> &Arc<dyn CoverCalculator> {
        self.rules.calculator()
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.rules.dataset_id()
    }

    fn adopt(&self, rule: &Rule) -> Result<Rule> {
        if rule.dataset_id() == self.dataset_id() && Arc::ptr_eq(rule.source(), self.calculator())
        {
            Ok(rule.clone())
        } else {
            self.rules.translate_with_data(rule)
        }
    }

    pub fn new_empty(&self, label: Label) -> RuleSet {
        RuleSet::new(label, BTreeSet::new(), Arc::clone(self.calculator()))
    }

    pub fn new_with_collection<I>(&self, label: Label, rules: I) -> Result<RuleSet>
    where
        I: IntoIterator<Item = Rule>,
    {
        let mut members = BTreeSet::new();
        for rule in rules {
            check_label(&label, rule.label())?;
            members.insert(self.adopt(&rule)?);
        }
        Ok(RuleSet::new(label, members, Arc::clone(self.calculator())))
    }

    /// A copy of `existing` with `rule` added.
    pub fn new_copy_with(&self, existing: &RuleSet, rule: Rule) -> Result<RuleSet> {
        check_label(existing.label(), rule.label())?;
        let mut members = BTreeSet::new();
        for member in existing.iter() {
            members.insert(self.adopt(member)?);
        }
        members.insert(self.adopt(&rule)?);
        Ok(RuleSet::new(
            existing.label().clone(),
            members,
            Arc::clone(self.calculator()),
        ))
    }

    /// Union of two rule sets predicting the same label.
    pub fn new_union(&self, a: &RuleSet, b: &RuleSet) -> Result<RuleSet> {
        check_label(a.label(), b.label())?;
        self.new_with_collection(a.label().clone(), a.iter().chain(b.iter()).cloned())
    }

    pub fn translate_with_data(&self, rule_set: &RuleSet) -> Result<RuleSet> {
        let members = rule_set
            .iter()
            .map(|rule| self.rules.translate_with_data(rule))
            .collect::<Result<BTreeSet<Rule>>>()?;
        Ok(RuleSet::new(
            rule_set.label().clone(),
            members,
            Arc::clone(self.calculator()),
        ))
    }
}
