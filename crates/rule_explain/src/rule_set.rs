//! Rule sets: a disjunction of rules predicting one label.

use crate::calculator::{ConfusionMatrix, CoverCalculator};
use crate::condition::Condition;
use crate::dataset::DatasetId;
use crate::error::Result;
use crate::feature::Label;
use crate::rule::Rule;
use core::fmt;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A set of rules sharing one label. A row is covered when any member covers
/// it, so the cover is the union of member covers.
#[derive(Clone)]
pub struct RuleSet {
    label: Label,
    rules: BTreeSet<Rule>,
    source: Arc<dyn CoverCalculator>,
}

impl RuleSet {
    pub(crate) fn new(label: Label, rules: BTreeSet<Rule>, source: Arc<dyn CoverCalculator>) -> Self {
        Self {
            label,
            rules,
            source,
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn source(&self) -> &Arc<dyn CoverCalculator> {
        &self.source
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.source.dataset_id()
    }

    /// Members in `(label, condition)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn rules(&self) -> &BTreeSet<Rule> {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.rules.contains(rule)
    }

    /// Total condition values over all members.
    pub fn value_count(&self) -> usize {
        self.rules.iter().map(Rule::value_count).sum()
    }

    pub fn confusion(&self) -> Result<ConfusionMatrix> {
        let conditions: Vec<&Condition> = self.rules.iter().map(Rule::condition).collect();
        self.source.confusion_any(&conditions, &self.label)
    }

    pub fn covered_count(&self) -> Result<u64> {
        Ok(self.confusion()?.covered())
    }
}

impl PartialEq for RuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.rules == other.rules
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("label", &self.label.to_string())
            .field("rules", &self.rules)
            .field("dataset", &self.dataset_id())
            .finish()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RuleSet({}, {} rules)", self.label, self.rules.len())?;
        for rule in &self.rules {
            writeln!(f, "  {}", rule)?;
        }
        Ok(())
    }
}
