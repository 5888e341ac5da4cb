//! Bounded caching decorators for bitmap calculators.
//!
//! Each metric kind gets its own bounded cache keyed by [`Condition`];
//! label-dependent metrics keep one cache per label so equal conditions for
//! different labels never collide. Caches are `DashMap`-backed: concurrent
//! readers and inserters never corrupt an entry, a race at worst recomputes a
//! bitmap twice.
//!
//! - [`CachedCalculator`]: miss => delegate, store, return.
//! - [`SubsetCachedCalculator`]: on a miss, derive the result from a cached
//!   parent condition that lacks exactly one feature.

mod plain;
mod subset;

pub use plain::CachedCalculator;
pub use subset::SubsetCachedCalculator;

use crate::calculator::BitmapCalculator;
use crate::condition::Condition;
use crate::conf::*;
use crate::error::{Error, Result};
use crate::feature::Label;
use dashmap::DashMap;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Covered,
    CorrectlyCovered,
    IncorrectlyCovered,
    CorrectlyNotCovered,
    IncorrectlyNotCovered,
}

/// How a parent result and a single-feature contribution combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOperator {
    Intersection,
    Union,
}

impl Metric {
    /// Adding a feature narrows the cover: covered-side metrics shrink (AND),
    /// not-covered-side metrics grow (OR).
    pub fn operator(&self) -> SetOperator {
        match self {
            Metric::Covered | Metric::CorrectlyCovered | Metric::IncorrectlyCovered => {
                SetOperator::Intersection
            }
            Metric::CorrectlyNotCovered | Metric::IncorrectlyNotCovered => SetOperator::Union,
        }
    }

    pub fn combine(&self, parent: RoaringBitmap, contribution: RoaringBitmap) -> RoaringBitmap {
        match self.operator() {
            SetOperator::Intersection => parent & contribution,
            SetOperator::Union => parent | contribution,
        }
    }
}

/// A metric request, carrying its label when the metric depends on one.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Query<'a> {
    Covered,
    CorrectlyCovered(&'a Label),
    IncorrectlyCovered(&'a Label),
    CorrectlyNotCovered(&'a Label),
    IncorrectlyNotCovered(&'a Label),
}

impl<'a> Query<'a> {
    pub(crate) fn metric(&self) -> Metric {
        match self {
            Query::Covered => Metric::Covered,
            Query::CorrectlyCovered(_) => Metric::CorrectlyCovered,
            Query::IncorrectlyCovered(_) => Metric::IncorrectlyCovered,
            Query::CorrectlyNotCovered(_) => Metric::CorrectlyNotCovered,
            Query::IncorrectlyNotCovered(_) => Metric::IncorrectlyNotCovered,
        }
    }

    pub(crate) fn run<C>(&self, calc: &C, condition: &Condition) -> Result<RoaringBitmap>
    where
        C: BitmapCalculator + ?Sized,
    {
        match *self {
            Query::Covered => calc.covered(condition),
            Query::CorrectlyCovered(label) => calc.correctly_covered(condition, label),
            Query::IncorrectlyCovered(label) => calc.incorrectly_covered(condition, label),
            Query::CorrectlyNotCovered(label) => calc.correctly_not_covered(condition, label),
            Query::IncorrectlyNotCovered(label) => calc.incorrectly_not_covered(condition, label),
        }
    }
}

/// Size-bounded concurrent map. Once full, inserting a new key evicts an
/// arbitrary resident entry. A capacity of zero stores nothing.
pub struct BoundedCache<K, V> {
    capacity: usize,
    map: DashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: DashMap::with_capacity(capacity.min(1024)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        while self.map.len() >= self.capacity && !self.map.contains_key(&key) {
            // Clone the key out first: the iterator guard must be released before removal
            let victim = self.map.iter().next().map(|entry| entry.key().clone());
            match victim {
                Some(victim) => {
                    self.map.remove(&victim);
                }
                None => break,
            }
        }
        self.map.insert(key, value);
    }

    pub fn clear(&self) {
        self.map.clear();
    }
}

/// Per-metric capacities. Label-dependent metrics apply the capacity per label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub covered: usize,
    pub correctly_covered: usize,
    pub incorrectly_covered: usize,
    pub correctly_not_covered: usize,
    pub incorrectly_not_covered: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            covered: DEFAULT_COVERED_CACHE_SIZE,
            correctly_covered: DEFAULT_CORRECTLY_COVERED_CACHE_SIZE,
            incorrectly_covered: DEFAULT_INCORRECTLY_COVERED_CACHE_SIZE,
            correctly_not_covered: DEFAULT_CORRECTLY_NOT_COVERED_CACHE_SIZE,
            incorrectly_not_covered: DEFAULT_INCORRECTLY_NOT_COVERED_CACHE_SIZE,
        }
    }
}

impl CacheConfig {
    /// Every metric capped at `capacity` entries.
    pub fn uniform(capacity: usize) -> Self {
        Self {
            covered: capacity,
            correctly_covered: capacity,
            incorrectly_covered: capacity,
            correctly_not_covered: capacity,
            incorrectly_not_covered: capacity,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // The minimal cover relies on these three caches
        if self.covered == 0 || self.correctly_covered == 0 || self.incorrectly_not_covered == 0 {
            return Err(Error::InvalidConfig(
                "covered, correctly_covered and incorrectly_not_covered caches need at least one entry"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn capacity(&self, metric: Metric) -> usize {
        match metric {
            Metric::Covered => self.covered,
            Metric::CorrectlyCovered => self.correctly_covered,
            Metric::IncorrectlyCovered => self.incorrectly_covered,
            Metric::CorrectlyNotCovered => self.correctly_not_covered,
            Metric::IncorrectlyNotCovered => self.incorrectly_not_covered,
        }
    }
}

#[derive(Default, Debug)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    subset_hits: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub subset_hits: u64,
}

impl CacheStats {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn subset_hit(&self) {
        self.subset_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            subset_hits: self.subset_hits.load(Ordering::Relaxed),
        }
    }
}

type BitmapCache = BoundedCache<Condition, RoaringBitmap>;

/// The five metric caches of one decorator.
pub(crate) struct MetricCaches {
    config: CacheConfig,
    covered: Arc<BitmapCache>,
    per_label: DashMap<(Metric, Label), Arc<BitmapCache>>,
}

impl MetricCaches {
    pub(crate) fn new(config: CacheConfig) -> Self {
        Self {
            covered: Arc::new(BoundedCache::new(config.covered)),
            config,
            per_label: DashMap::new(),
        }
    }

    pub(crate) fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub(crate) fn cache_for(&self, query: &Query<'_>) -> Arc<BitmapCache> {
        let label = match *query {
            Query::Covered => return Arc::clone(&self.covered),
            Query::CorrectlyCovered(l)
            | Query::IncorrectlyCovered(l)
            | Query::CorrectlyNotCovered(l)
            | Query::IncorrectlyNotCovered(l) => l,
        };
        let metric = query.metric();
        if let Some(cache) = self.per_label.get(&(metric, label.clone())) {
            return Arc::clone(cache.value());
        }
        let capacity = self.config.capacity(metric);
        Arc::clone(
            self.per_label
                .entry((metric, label.clone()))
                .or_insert_with(|| Arc::new(BoundedCache::new(capacity)))
                .value(),
        )
    }

    pub(crate) fn clear(&self) {
        self.covered.clear();
        self.per_label.clear();
    }
}
