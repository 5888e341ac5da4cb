use super::{ConfusionMatrix, CoverCalculator};
use crate::condition::Condition;
use crate::dataset::{Dataset, DatasetId};
use crate::error::{Error, Result};
use crate::feature::Label;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Count-only calculator that evaluates conditions row by row.
///
/// No bitsets are materialized, so it cannot back the caching decorators, but
/// it answers the same count contract as the index-backed calculators.
#[derive(Clone)]
pub struct ScanCalculator {
    dataset: Arc<dyn Dataset>,
}

// Per-feature (allowed codes, column) pairs of a condition
type Terms<'a> = Vec<(&'a BTreeSet<u32>, &'a [u32])>;

impl ScanCalculator {
    pub fn new(dataset: Arc<dyn Dataset>) -> Self {
        Self { dataset }
    }

    fn terms<'a>(&'a self, condition: &'a Condition) -> Result<Terms<'a>> {
        condition
            .iter()
            .map(|(feature, codes)| {
                if let Some(bad) = codes.iter().find(|&&c| !feature.contains_code(c)) {
                    return Err(Error::value_not_found(feature.name(), bad));
                }
                Ok((codes, self.dataset.codes(feature)?))
            })
            .collect()
    }

    fn label_column(&self, label: &Label) -> Result<&[u32]> {
        if !label.feature().contains_code(label.code()) {
            return Err(Error::value_not_found(label.feature().name(), label.code()));
        }
        self.dataset.codes(label.feature())
    }

    fn row_matches(terms: &Terms<'_>, row: usize) -> bool {
        !terms.is_empty() && terms.iter().all(|(codes, column)| codes.contains(&column[row]))
    }

    fn count(&self, any_of: &[Terms<'_>], label: &Label) -> Result<ConfusionMatrix> {
        let label_column = self.label_column(label)?;
        let mut matrix = ConfusionMatrix::default();
        for (row, &code) in label_column.iter().enumerate() {
            let covered = any_of.iter().any(|terms| Self::row_matches(terms, row));
            let positive = code == label.code();
            match (covered, positive) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_positive += 1,
                (false, true) => matrix.false_negative += 1,
                (false, false) => matrix.true_negative += 1,
            }
        }
        Ok(matrix)
    }
}

impl CoverCalculator for ScanCalculator {
    fn dataset_id(&self) -> DatasetId {
        self.dataset.id()
    }

    fn row_count(&self) -> u64 {
        self.dataset.row_count() as u64
    }

    fn label_count(&self, label: &Label) -> Result<u64> {
        let column = self.label_column(label)?;
        Ok(column.iter().filter(|&&c| c == label.code()).count() as u64)
    }

    fn confusion(&self, condition: &Condition, label: &Label) -> Result<ConfusionMatrix> {
        let terms = self.terms(condition)?;
        self.count(&[terms], label)
    }

    fn confusion_any(&self, conditions: &[&Condition], label: &Label) -> Result<ConfusionMatrix> {
        let any_of = conditions
            .iter()
            .map(|c| self.terms(c))
            .collect::<Result<Vec<_>>>()?;
        self.count(&any_of, label)
    }
}
