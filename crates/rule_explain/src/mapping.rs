//! Seeding rule sets from per-row explanations.
//!
//! A [`LocalExplainer`] proposes one rule for a single row; the
//! [`ExplainerMapper`] runs it over a selection of rows and gathers the rules
//! predicting the requested label into a seed [`RuleSet`].

use crate::condition::Condition;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::factory::RuleSetFactory;
use crate::feature::{Feature, Label};
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One dataset row, as codes keyed by feature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowInstance {
    index: usize,
    values: BTreeMap<Feature, u32>,
    labels: BTreeMap<Feature, u32>,
}

impl RowInstance {
    pub fn from_dataset(dataset: &dyn Dataset, index: usize) -> Result<Self> {
        if index >= dataset.row_count() {
            return Err(Error::RowOutOfRange {
                row: index,
                rows: dataset.row_count(),
            });
        }
        let read = |features: &[Feature]| -> Result<BTreeMap<Feature, u32>> {
            features
                .iter()
                .map(|f| Ok((f.clone(), dataset.codes(f)?[index])))
                .collect()
        };
        Ok(Self {
            index,
            values: read(dataset.features())?,
            labels: read(dataset.label_features())?,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn values(&self) -> &BTreeMap<Feature, u32> {
        &self.values
    }

    pub fn value(&self, feature: &Feature) -> Option<u32> {
        self.values.get(feature).copied()
    }

    /// Whether `condition` covers this row.
    pub fn satisfies(&self, condition: &Condition) -> bool {
        condition.matches(|feature| self.value(feature))
    }

    /// The row's value of `label_feature`, as a label.
    pub fn label(&self, label_feature: &Feature) -> Result<Label> {
        let code = self
            .labels
            .get(label_feature)
            .ok_or_else(|| Error::FeatureNotFound(label_feature.name().to_string()))?;
        Label::new(label_feature.clone(), *code)
    }
}

pub trait LocalExplainer: Send + Sync {
    fn explain(&self, instance: &RowInstance) -> Result<Rule>;
}

/// Explains a row by its full feature assignment, predicting the row's own
/// label value. Every row is covered by its own explanation.
pub struct ExactMatchExplainer {
    factory: RuleSetFactory,
    label_feature: Feature,
}

impl ExactMatchExplainer {
    pub fn new(factory: RuleSetFactory, label_feature: Feature) -> Self {
        Self {
            factory,
            label_feature,
        }
    }
}

impl LocalExplainer for ExactMatchExplainer {
    fn explain(&self, instance: &RowInstance) -> Result<Rule> {
        let condition =
            Condition::from_terms(instance.values().iter().map(|(f, &c)| (f.clone(), [c])))?;
        let label = instance.label(&self.label_feature)?;
        self.factory.rule_factory().initialize(condition, label)
    }
}

pub struct ExplainerMapper<E> {
    explainer: E,
    factory: RuleSetFactory,
}

impl<E: LocalExplainer> ExplainerMapper<E> {
    pub fn new(explainer: E, factory: RuleSetFactory) -> Self {
        Self { explainer, factory }
    }

    pub fn explainer(&self) -> &E {
        &self.explainer
    }

    /// Explains each row in `rows` and collects the explanations predicting
    /// `label`. Explanations for other labels are skipped.
    pub fn map(&self, dataset: &dyn Dataset, rows: &[usize], label: &Label) -> Result<RuleSet> {
        let mut result = self.factory.new_empty(label.clone());
        let mut skipped = 0usize;
        for &row in rows {
            let instance = RowInstance::from_dataset(dataset, row)?;
            let rule = self.explainer.explain(&instance)?;
            if rule.label() != label {
                skipped += 1;
                continue;
            }
            debug!(row, rule = %rule, "row explained");
            result = self.factory.new_copy_with(&result, rule)?;
        }
        info!(
            rows = rows.len(),
            skipped,
            rules = result.len(),
            label = %label,
            "seed rule set mapped"
        );
        Ok(result)
    }
}
