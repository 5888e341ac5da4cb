//! The dataset collaborator.
//!
//! Ingestion and discretization happen upstream; this crate only needs the
//! dictionary-encoded view exposed by [`Dataset`]. [`CategoricalDataset`] is the
//! in-memory implementation, built either from code columns or from a polars
//! `DataFrame` (see [`crate::dataframe`]).

use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a dataset. Two calculators over datasets with equal ids share
/// rule statistics; different ids force recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(u64);

impl DatasetId {
    pub fn fresh() -> Self {
        DatasetId(NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub trait Dataset: Send + Sync {
    fn id(&self) -> DatasetId;

    fn row_count(&self) -> usize;

    /// Input features, in column order.
    fn features(&self) -> &[Feature];

    /// Label columns, in column order.
    fn label_features(&self) -> &[Feature];

    /// Per-row codes of a feature or label column.
    fn codes(&self, feature: &Feature) -> Result<&[u32]>;

    /// Looks a column up by name, input features first.
    fn feature_by_name(&self, name: &str) -> Result<&Feature> {
        self.features()
            .iter()
            .chain(self.label_features().iter())
            .find(|f| f.name() == name)
            .ok_or_else(|| Error::FeatureNotFound(name.to_string()))
    }
}

/// A dictionary-encoded column.
#[derive(Clone, Debug)]
pub struct CategoricalColumn {
    pub feature: Feature,
    pub codes: Vec<u32>,
}

impl CategoricalColumn {
    pub fn new(feature: Feature, codes: Vec<u32>) -> Result<Self> {
        if let Some(bad) = codes.iter().find(|&&c| !feature.contains_code(c)) {
            return Err(Error::value_not_found(feature.name(), bad));
        }
        Ok(Self { feature, codes })
    }

    /// Encode raw values; the dictionary follows first-seen order.
    pub fn from_values<S: AsRef<str>>(kind: FeatureKind, name: &str, values: &[S]) -> Self {
        let feature = Feature::new(kind, name, values.iter().map(|v| v.as_ref().to_string()));
        let codes = values
            .iter()
            .map(|v| feature.code_of(v.as_ref()).unwrap_or_default())
            .collect();
        Self { feature, codes }
    }
}

#[derive(Clone, Debug)]
pub struct CategoricalDataset {
    id: DatasetId,
    row_count: usize,
    features: Vec<Feature>,
    labels: Vec<Feature>,
    columns: HashMap<Feature, Vec<u32>>,
}

impl CategoricalDataset {
    pub fn new(columns: Vec<CategoricalColumn>) -> Result<Self> {
        let row_count = columns.first().map(|c| c.codes.len()).unwrap_or(0);
        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut by_feature = HashMap::with_capacity(columns.len());

        for column in columns {
            if column.codes.len() != row_count {
                return Err(Error::ShapeMismatch {
                    column: column.feature.name().to_string(),
                    found: column.codes.len(),
                    expected: row_count,
                });
            }
            if by_feature.contains_key(&column.feature) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate column '{}'",
                    column.feature.name()
                )));
            }
            match column.feature.kind() {
                FeatureKind::Categorical => features.push(column.feature.clone()),
                FeatureKind::Label => labels.push(column.feature.clone()),
            }
            by_feature.insert(column.feature, column.codes);
        }

        Ok(Self {
            id: DatasetId::fresh(),
            row_count,
            features,
            labels,
            columns: by_feature,
        })
    }

    /// Rows `indices` of this dataset as a new dataset with a fresh identity.
    /// Feature dictionaries are kept, so conditions transfer unchanged.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for feature in self.features.iter().chain(self.labels.iter()) {
            let codes = self.codes(feature)?;
            let mut selected = Vec::with_capacity(indices.len());
            for &i in indices {
                let code = codes.get(i).copied().ok_or(Error::RowOutOfRange {
                    row: i,
                    rows: codes.len(),
                })?;
                selected.push(code);
            }
            columns.push(CategoricalColumn {
                feature: feature.clone(),
                codes: selected,
            });
        }
        Self::new(columns)
    }
}

impl Dataset for CategoricalDataset {
    fn id(&self) -> DatasetId {
        self.id
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn features(&self) -> &[Feature] {
        &self.features
    }

    fn label_features(&self) -> &[Feature] {
        &self.labels
    }

    fn codes(&self, feature: &Feature) -> Result<&[u32]> {
        self.columns
            .get(feature)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::FeatureNotFound(feature.name().to_string()))
    }
}
