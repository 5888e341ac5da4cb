use crate::conf::NULL_VALUE;
use crate::dataset::{CategoricalColumn, CategoricalDataset};
use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureKind};
use polars::prelude::*;
use std::collections::HashMap;

// Reusable first-seen-order dictionary encoding
fn ordered_codes<'a, I>(iter: I) -> (Vec<String>, Vec<u32>)
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut pos_map: HashMap<&'a str, u32> = HashMap::new();
    let mut domain: Vec<String> = Vec::new();
    let mut codes: Vec<u32> = Vec::new();

    for opt_value in iter {
        let value = opt_value.unwrap_or(NULL_VALUE);
        let code = match pos_map.get(value) {
            Some(&code) => code,
            None => {
                let code = domain.len() as u32;
                pos_map.insert(value, code);
                domain.push(value.to_string());
                code
            }
        };
        codes.push(code);
    }
    (domain, codes)
}

/// Extension methods for Series
pub trait RuleSeriesExt {
    /// Dictionary-encode this series as a categorical column of the given kind.
    fn to_categorical_column(&self, kind: FeatureKind) -> Result<CategoricalColumn>;
}

impl RuleSeriesExt for Series {
    fn to_categorical_column(&self, kind: FeatureKind) -> Result<CategoricalColumn> {
        // Work on the string view so Enum/Categorical/numeric columns encode alike
        let as_strings = self.cast(&DataType::String)?;
        let (domain, codes) = ordered_codes(as_strings.str()?.into_iter());
        let feature = Feature::new(kind, self.name().as_str(), domain);
        Ok(CategoricalColumn { feature, codes })
    }
}

/// Extension methods for DataFrame
pub trait RuleDataFrameExt {
    /// Encode every column; those named in `label_columns` become label features.
    fn to_categorical_dataset(&self, label_columns: &[&str]) -> Result<CategoricalDataset>;
}

impl RuleDataFrameExt for DataFrame {
    fn to_categorical_dataset(&self, label_columns: &[&str]) -> Result<CategoricalDataset> {
        let names: Vec<String> = self
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(missing) = label_columns.iter().find(|l| !names.iter().any(|n| n == *l)) {
            return Err(Error::FeatureNotFound(missing.to_string()));
        }

        let mut columns = Vec::with_capacity(names.len());
        for column in self.get_columns() {
            let kind = if label_columns.contains(&column.name().as_str()) {
                FeatureKind::Label
            } else {
                FeatureKind::Categorical
            };
            let series = column.as_materialized_series();
            columns.push(series.to_categorical_column(kind)?);
        }
        CategoricalDataset::new(columns)
    }
}
