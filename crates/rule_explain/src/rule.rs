//! Rules: a condition bound to a predicted label.
//!
//! Rules are immutable. Their confusion statistics are either frozen when the
//! rule is built or recomputed through the source calculator on every call,
//! depending on the [`StatisticsPolicy`](crate::factory::StatisticsPolicy) of
//! the factory that built them. Equality, hashing and ordering only look at the
//! `(label, condition)` pair.

use crate::calculator::{ConfusionMatrix, CoverCalculator};
use crate::condition::Condition;
use crate::dataset::DatasetId;
use crate::error::Result;
use crate::feature::{Feature, Label};
use core::fmt;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Statistics {
    Frozen(ConfusionMatrix),
    Deferred,
}

#[derive(Clone)]
pub struct Rule {
    condition: Condition,
    label: Label,
    statistics: Statistics,
    source: Arc<dyn CoverCalculator>,
}

impl Rule {
    pub(crate) fn new(
        condition: Condition,
        label: Label,
        statistics: Statistics,
        source: Arc<dyn CoverCalculator>,
    ) -> Self {
        Self {
            condition,
            label,
            statistics,
            source,
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn label_feature(&self) -> &Feature {
        self.label.feature()
    }

    pub fn label_value(&self) -> u32 {
        self.label.code()
    }

    /// Calculator the rule was built against.
    pub fn source(&self) -> &Arc<dyn CoverCalculator> {
        &self.source
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.source.dataset_id()
    }

    /// Whether statistics were computed once at construction.
    pub fn is_frozen(&self) -> bool {
        matches!(self.statistics, Statistics::Frozen(_))
    }

    pub(crate) fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn confusion(&self) -> Result<ConfusionMatrix> {
        match self.statistics {
            Statistics::Frozen(matrix) => Ok(matrix),
            Statistics::Deferred => self.source.confusion(&self.condition, &self.label),
        }
    }

    pub fn covered_count(&self) -> Result<u64> {
        Ok(self.confusion()?.covered())
    }

    pub fn precision(&self) -> Result<f64> {
        Ok(self.confusion()?.precision())
    }

    pub fn coverage(&self) -> Result<f64> {
        Ok(self.confusion()?.coverage())
    }

    /// Number of condition values, the parsimony measure of a rule.
    pub fn value_count(&self) -> usize {
        self.condition.value_count()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.condition == other.condition
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
        self.condition.hash(state);
    }
}

impl PartialOrd for Rule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rule {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.condition.cmp(&other.condition))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("condition", &self.condition.to_string())
            .field("label", &self.label.to_string())
            .field("statistics", &self.statistics)
            .field("dataset", &self.dataset_id())
            .finish()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN {}", self.condition, self.label)
    }
}
