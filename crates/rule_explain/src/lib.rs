//! # Rule Explain
//!
//! Mining and optimizing global rule explanations ("rows matching these
//! categorical conditions get label L") over a tabular dataset.
//!
//! ## Key Features
//!
//! - **Bitmap Index**: one roaring bitmap per `(feature, value)` pair; covers of
//!   conjunctive and disjunctive conditions are bitmap unions and intersections
//! - **Layered Caching**: calculator decorators memoizing covers, with optional
//!   derivation of a condition's cover from a cached sub-condition
//! - **Optimization**: genetic, k-neighbourhood local search and brute-force
//!   strategies over bit-vector encodings of rules and rule sets
//! - **Metrics**: signed rule mutual information (RMI) and Jaccard similarity
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use polars::prelude::*;
//! use rule_explain::prelude::*;
//!
//! let df = df!("color" => ["red", "blue", "red"], "class" => ["yes", "no", "yes"])?;
//! let dataset = df.to_categorical_dataset(&["class"])?;
//!
//! let calculator: Arc<dyn CoverCalculator> = Arc::new(CachedCalculator::new(
//!     IndexCalculator::from_dataset(&dataset)?,
//!     CacheConfig::default(),
//! ));
//! let factory = RuleSetFactory::new(RuleFactory::eager(calculator));
//!
//! let color = dataset.feature_by_name("color")?.clone();
//! let class = dataset.feature_by_name("class")?.clone();
//! let rule = factory.rule_factory().initialize(
//!     Condition::from_values(&color, &["red"])?,
//!     Label::from_value(class, "yes")?,
//! )?;
//! assert_eq!(rule.covered_count()?, 2);
//! ```

// Module declarations
pub mod cache;
pub mod calculator;
pub mod condition;
pub mod conf;
pub mod dataframe;
pub mod dataset;
pub mod error;
pub mod factory;
pub mod feature;
pub mod index;
pub mod mapping;
pub mod metrics;
pub mod optimization;
pub mod postprocess;
pub mod rule;
pub mod rule_set;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::cache::{
        BoundedCache, CacheConfig, CacheStatsSnapshot, CachedCalculator, Metric,
        SubsetCachedCalculator,
    };
    pub use crate::calculator::{
        BitmapCalculator, ConfusionMatrix, CoverCalculator, IndexCalculator, MinimalCover,
        ScanCalculator,
    };
    pub use crate::condition::Condition;
    pub use crate::dataframe::{RuleDataFrameExt, RuleSeriesExt};
    pub use crate::dataset::{CategoricalColumn, CategoricalDataset, Dataset, DatasetId};
    pub use crate::error::{Error, Result};
    pub use crate::factory::{RuleFactory, RuleSetFactory, StatisticsPolicy};
    pub use crate::feature::{Feature, FeatureKind, Label};
    pub use crate::index::ConditionIndex;
    pub use crate::mapping::{ExactMatchExplainer, ExplainerMapper, LocalExplainer, RowInstance};
    pub use crate::metrics::{
        calculate_rmi, jaccard_dissimilarity, jaccard_similarity, max_rmi, rule_rmi, scaled_rmi,
    };
    pub use crate::optimization::{
        BruteForceConfig, BruteForceSearch, GeneticConfig, GeneticSearch, LocalSearchConfig,
        ObjectiveFunction, Optimizer, OptimizerConfig, RuleRmiObjective, RuleSetRmiObjective,
        RuleSetSpace, RuleSpace, SearchLevel, SearchStrategy, StrategyConfig, TrajectorySearch,
    };
    pub use crate::postprocess::{JaccardFilter, Postprocessor, TopKFilter};
    pub use crate::rule::Rule;
    pub use crate::rule_set::RuleSet;
}
