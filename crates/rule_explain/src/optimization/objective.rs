use crate::error::{Error, Result};
use crate::metrics::{max_rmi, scaled_rmi};
use crate::rule::Rule;
use crate::rule_set::RuleSet;

/// Scoring function over candidates; higher is better.
///
/// `initialize` is called once per seed before any `evaluate`, and may
/// precompute seed-dependent constants.
pub trait ObjectiveFunction<T>: Send + Sync {
    fn initialize(&mut self, seed: &RuleSet) -> Result<()>;

    fn evaluate(&self, candidate: &T) -> Result<f64>;
}

fn label_max_rmi(seed: &RuleSet) -> Result<f64> {
    let source = seed.source();
    let label_count = source.label_count(seed.label())?;
    Ok(max_rmi(label_count, source.row_count()))
}

fn uninitialized() -> Error {
    Error::InvalidConfig("objective evaluated before initialize".to_string())
}

/// Scaled RMI of a rule with a per-value parsimony penalty.
#[derive(Clone, Debug, Default)]
pub struct RuleRmiObjective {
    penalty: f64,
    max_rmi: Option<f64>,
}

impl RuleRmiObjective {
    pub fn new(penalty: f64) -> Self {
        Self {
            penalty,
            max_rmi: None,
        }
    }
}

impl ObjectiveFunction<Rule> for RuleRmiObjective {
    fn initialize(&mut self, seed: &RuleSet) -> Result<()> {
        self.max_rmi = Some(label_max_rmi(seed)?);
        Ok(())
    }

    fn evaluate(&self, rule: &Rule) -> Result<f64> {
        let max = self.max_rmi.ok_or_else(uninitialized)?;
        Ok(scaled_rmi(
            &rule.confusion()?,
            max,
            rule.value_count(),
            self.penalty,
        ))
    }
}

/// Scaled RMI of a rule set's union cover, penalized by its total value count.
#[derive(Clone, Debug, Default)]
pub struct RuleSetRmiObjective {
    penalty: f64,
    max_rmi: Option<f64>,
}

impl RuleSetRmiObjective {
    pub fn new(penalty: f64) -> Self {
        Self {
            penalty,
            max_rmi: None,
        }
    }
}

impl ObjectiveFunction<RuleSet> for RuleSetRmiObjective {
    fn initialize(&mut self, seed: &RuleSet) -> Result<()> {
        self.max_rmi = Some(label_max_rmi(seed)?);
        Ok(())
    }

    fn evaluate(&self, rule_set: &RuleSet) -> Result<f64> {
        let max = self.max_rmi.ok_or_else(uninitialized)?;
        Ok(scaled_rmi(
            &rule_set.confusion()?,
            max,
            rule_set.value_count(),
            self.penalty,
        ))
    }
}
