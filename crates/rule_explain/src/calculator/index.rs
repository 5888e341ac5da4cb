use super::{bitmap_confusion, bitmap_confusion_any, BitmapCalculator, ConfusionMatrix};
use super::{CoverCalculator, MinimalCover};
use crate::condition::Condition;
use crate::dataset::{Dataset, DatasetId};
use crate::error::Result;
use crate::feature::Label;
use crate::index::ConditionIndex;
use roaring::RoaringBitmap;
use std::sync::Arc;

/// Bitmap calculator answering every query straight from a [`ConditionIndex`].
#[derive(Clone)]
pub struct IndexCalculator {
    index: Arc<ConditionIndex>,
}

impl IndexCalculator {
    pub fn new(index: Arc<ConditionIndex>) -> Self {
        Self { index }
    }

    pub fn from_dataset(dataset: &dyn Dataset) -> Result<Self> {
        Ok(Self::new(Arc::new(ConditionIndex::build(dataset)?)))
    }

    pub fn index(&self) -> &ConditionIndex {
        &self.index
    }
}

impl CoverCalculator for IndexCalculator {
    fn dataset_id(&self) -> DatasetId {
        self.index.dataset_id()
    }

    fn row_count(&self) -> u64 {
        self.index.row_count()
    }

    fn label_count(&self, label: &Label) -> Result<u64> {
        Ok(self.index.label_rows(label)?.len())
    }

    fn confusion(&self, condition: &Condition, label: &Label) -> Result<ConfusionMatrix> {
        bitmap_confusion(self, condition, label)
    }

    fn confusion_any(&self, conditions: &[&Condition], label: &Label) -> Result<ConfusionMatrix> {
        bitmap_confusion_any(self, conditions, label)
    }
}

impl BitmapCalculator for IndexCalculator {
    fn label_rows(&self, label: &Label) -> Result<RoaringBitmap> {
        self.index.label_rows(label)
    }

    fn covered(&self, condition: &Condition) -> Result<RoaringBitmap> {
        self.index.query(condition)
    }

    fn correctly_covered(&self, condition: &Condition, label: &Label) -> Result<RoaringBitmap> {
        let mut rows = self.index.query(condition)?;
        rows &= self.index.label_rows(label)?;
        Ok(rows)
    }

    fn incorrectly_covered(&self, condition: &Condition, label: &Label) -> Result<RoaringBitmap> {
        let mut rows = self.index.query(condition)?;
        rows -= self.index.label_rows(label)?;
        Ok(rows)
    }

    fn correctly_not_covered(
        &self,
        condition: &Condition,
        label: &Label,
    ) -> Result<RoaringBitmap> {
        let covered = self.index.query(condition)?;
        let mut rows = self.index.all_rows() - &covered;
        rows -= self.index.label_rows(label)?;
        Ok(rows)
    }

    fn incorrectly_not_covered(
        &self,
        condition: &Condition,
        label: &Label,
    ) -> Result<RoaringBitmap> {
        let covered = self.index.query(condition)?;
        Ok(self.index.label_rows(label)? - covered)
    }

    // One query and one intersection; the other cells are derived from counts.
    fn minimal_cover(&self, condition: &Condition, label: &Label) -> Result<MinimalCover> {
        let covered = self.index.query(condition)?;
        let label_rows = self.index.label_rows(label)?;
        let correctly_covered = &covered & &label_rows;
        let incorrectly_not_covered = label_rows - &covered;
        Ok(MinimalCover {
            covered,
            correctly_covered,
            incorrectly_not_covered,
        })
    }
}
