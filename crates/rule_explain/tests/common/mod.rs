#![allow(dead_code)]

use std::sync::Arc;

use rule_explain::prelude::*;

pub const ROWS: usize = 20;

/// 20 rows, 5 categorical features and one binary label `y`.
///
/// - `f0`: row 0 alone holds `a`, every other row holds `b`
/// - `f1`: `p`/`q` alternating, so its two values span every row
/// - `f2`: `r0`..`r3` by `row % 4`
/// - `f3`: `lo` for rows 0..10, `hi` for rows 10..20
/// - `f4`: `s0`..`s4` by `row % 5`
/// - `y`:  `yes` on even rows, `no` on odd rows
pub fn fixture() -> CategoricalDataset {
    let f0: Vec<&str> = (0..ROWS).map(|i| if i == 0 { "a" } else { "b" }).collect();
    let f1: Vec<&str> = (0..ROWS).map(|i| if i % 2 == 0 { "p" } else { "q" }).collect();
    let f2: Vec<String> = (0..ROWS).map(|i| format!("r{}", i % 4)).collect();
    let f3: Vec<&str> = (0..ROWS).map(|i| if i < 10 { "lo" } else { "hi" }).collect();
    let f4: Vec<String> = (0..ROWS).map(|i| format!("s{}", i % 5)).collect();
    let y: Vec<&str> = (0..ROWS).map(|i| if i % 2 == 0 { "yes" } else { "no" }).collect();

    CategoricalDataset::new(vec![
        CategoricalColumn::from_values(FeatureKind::Categorical, "f0", &f0),
        CategoricalColumn::from_values(FeatureKind::Categorical, "f1", &f1),
        CategoricalColumn::from_values(FeatureKind::Categorical, "f2", &f2),
        CategoricalColumn::from_values(FeatureKind::Categorical, "f3", &f3),
        CategoricalColumn::from_values(FeatureKind::Categorical, "f4", &f4),
        CategoricalColumn::from_values(FeatureKind::Label, "y", &y),
    ])
    .expect("fixture dataset")
}

pub fn feature(dataset: &CategoricalDataset, name: &str) -> Feature {
    dataset.feature_by_name(name).expect("feature").clone()
}

pub fn label(dataset: &CategoricalDataset, value: &str) -> Label {
    Label::from_value(feature(dataset, "y"), value).expect("label")
}

pub fn condition(dataset: &CategoricalDataset, terms: &[(&str, &[&str])]) -> Condition {
    let mut condition = Condition::new();
    for (name, values) in terms {
        let f = feature(dataset, name);
        let codes: Vec<u32> = values.iter().map(|v| f.code_of(v).expect("code")).collect();
        condition = condition.with(f, codes).expect("condition");
    }
    condition
}

pub fn index_calculator(dataset: &CategoricalDataset) -> IndexCalculator {
    IndexCalculator::from_dataset(dataset).expect("index")
}

pub fn eager_factory(dataset: &CategoricalDataset) -> RuleSetFactory {
    let calculator: Arc<dyn CoverCalculator> = Arc::new(index_calculator(dataset));
    RuleSetFactory::new(RuleFactory::eager(calculator))
}

pub fn pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .expect("thread pool")
}

pub fn rows(bitmap: &roaring::RoaringBitmap) -> Vec<u32> {
    bitmap.iter().collect()
}
