//! Inverted bitmap index over a categorical dataset.
//!
//! One compressed bitmap per `(feature, code)`, built with a single pass per
//! column. Label columns are indexed the same way, which gives the label row
//! sets used by the calculators.

use crate::condition::Condition;
use crate::dataset::{Dataset, DatasetId};
use crate::error::{Error, Result};
use crate::feature::{Feature, Label};
use rayon::prelude::*;
use roaring::RoaringBitmap;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub struct ConditionIndex {
    dataset_id: DatasetId,
    row_count: u32,
    all_rows: RoaringBitmap,
    bitmaps: HashMap<Feature, Vec<RoaringBitmap>>,
}

fn index_column(feature: &Feature, codes: &[u32]) -> Vec<RoaringBitmap> {
    let mut per_value = vec![RoaringBitmap::new(); feature.cardinality()];
    for (row, &code) in codes.iter().enumerate() {
        // Codes were validated against the domain when the column was built
        if let Some(bitmap) = per_value.get_mut(code as usize) {
            bitmap.insert(row as u32);
        }
    }
    per_value
}

impl ConditionIndex {
    pub fn build(dataset: &dyn Dataset) -> Result<Self> {
        let columns: Vec<(&Feature, &[u32])> = dataset
            .features()
            .iter()
            .chain(dataset.label_features().iter())
            .map(|f| dataset.codes(f).map(|codes| (f, codes)))
            .collect::<Result<_>>()?;

        let bitmaps: HashMap<Feature, Vec<RoaringBitmap>> = columns
            .par_iter()
            .map(|(feature, codes)| ((*feature).clone(), index_column(feature, codes)))
            .collect();

        let row_count = dataset.row_count() as u32;
        debug!(
            columns = bitmaps.len(),
            rows = row_count,
            "built condition index"
        );
        Ok(Self {
            dataset_id: dataset.id(),
            row_count,
            all_rows: (0..row_count).collect(),
            bitmaps,
        })
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.dataset_id
    }

    pub fn row_count(&self) -> u64 {
        self.row_count as u64
    }

    pub fn all_rows(&self) -> &RoaringBitmap {
        &self.all_rows
    }

    fn column(&self, feature: &Feature) -> Result<&[RoaringBitmap]> {
        self.bitmaps
            .get(feature)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::FeatureNotFound(feature.name().to_string()))
    }

    /// Rows whose value for `feature` is any of `codes`.
    pub fn query_values(&self, feature: &Feature, codes: &BTreeSet<u32>) -> Result<RoaringBitmap> {
        let column = self.column(feature)?;
        let mut rows = RoaringBitmap::new();
        for &code in codes {
            let bitmap = column
                .get(code as usize)
                .ok_or_else(|| Error::value_not_found(feature.name(), code))?;
            rows |= bitmap;
        }
        Ok(rows)
    }

    /// Rows satisfying every term of `condition`; empty for an empty condition.
    pub fn query(&self, condition: &Condition) -> Result<RoaringBitmap> {
        let mut result: Option<RoaringBitmap> = None;
        for (feature, codes) in condition.iter() {
            let rows = self.query_values(feature, codes)?;
            result = Some(match result {
                Some(acc) => acc & rows,
                None => rows,
            });
        }
        Ok(result.unwrap_or_default())
    }

    pub fn label_rows(&self, label: &Label) -> Result<RoaringBitmap> {
        let column = self.column(label.feature())?;
        column
            .get(label.code() as usize)
            .cloned()
            .ok_or_else(|| Error::value_not_found(label.feature().name(), label.code()))
    }
}
