use super::{BitmapCache, CacheConfig, CacheStats, CacheStatsSnapshot, MetricCaches, Query};
use crate::calculator::{bitmap_confusion, bitmap_confusion_any};
use crate::calculator::{BitmapCalculator, ConfusionMatrix, CoverCalculator, MinimalCover};
use crate::condition::Condition;
use crate::dataset::DatasetId;
use crate::error::Result;
use crate::feature::Label;
use roaring::RoaringBitmap;
use tracing::trace;

/// Bounded cache that answers misses from cached near-subsets.
///
/// For a condition `C` with `n >= 2` features, any cached parent `C \ {f}` gives
/// `metric(C) = metric(C \ {f}) op metric({f})`, where `op` is AND for the
/// covered-side metrics and OR for the not-covered side. Optimizers that grow
/// rules one term at a time therefore pay a single bitmap operation per step.
/// Single-feature conditions are never derived: their parent would be the empty
/// condition, which covers nothing rather than everything.
pub struct SubsetCachedCalculator<C> {
    inner: C,
    caches: MetricCaches,
    stats: CacheStats,
}

impl<C: BitmapCalculator> SubsetCachedCalculator<C> {
    pub fn new(inner: C, config: CacheConfig) -> Self {
        Self {
            inner,
            caches: MetricCaches::new(config),
            stats: CacheStats::default(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn config(&self) -> &CacheConfig {
        self.caches.config()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn clear(&self) {
        self.caches.clear();
    }

    fn lookup(&self, query: Query<'_>, condition: &Condition) -> Result<RoaringBitmap> {
        let cache = self.caches.cache_for(&query);
        if let Some(rows) = cache.get(condition) {
            self.stats.hit();
            return Ok(rows);
        }
        let rows = match self.from_parent(&cache, query, condition)? {
            Some(rows) => {
                self.stats.subset_hit();
                rows
            }
            None => {
                self.stats.miss();
                query.run(&self.inner, condition)?
            }
        };
        cache.insert(condition.clone(), rows.clone());
        Ok(rows)
    }

    fn from_parent(
        &self,
        cache: &BitmapCache,
        query: Query<'_>,
        condition: &Condition,
    ) -> Result<Option<RoaringBitmap>> {
        if condition.len() < 2 {
            return Ok(None);
        }
        for feature in condition.features() {
            let parent = condition.without(feature);
            if let Some(parent_rows) = cache.get(&parent) {
                trace!(metric = ?query.metric(), dropped = %feature, "derived from cached parent");
                let contribution = self.lookup(query, &condition.only(feature))?;
                return Ok(Some(query.metric().combine(parent_rows, contribution)));
            }
        }
        Ok(None)
    }
}

impl<C: BitmapCalculator> CoverCalculator for SubsetCachedCalculator<C> {
    fn dataset_id(&self) -> DatasetId {
        self.inner.dataset_id()
    }

    fn row_count(&self) -> u64 {
        self.inner.row_count()
    }

    fn label_count(&self, label: &Label) -> Result<u64> {
        self.inner.label_count(label)
    }

    fn confusion(&self, condition: &Condition, label: &Label) -> Result<ConfusionMatrix> {
        bitmap_confusion(self, condition, label)
    }

    fn confusion_any(&self, conditions: &[&Condition], label: &Label) -> Result<ConfusionMatrix> {
        bitmap_confusion_any(self, conditions, label)
    }
}

impl<C: BitmapCalculator> BitmapCalculator for SubsetCachedCalculator<C> {
    fn label_rows(&self, label: &Label) -> Result<RoaringBitmap> {
        self.inner.label_rows(label)
    }

    fn covered(&self, condition: &Condition) -> Result<RoaringBitmap> {
        self.lookup(Query::Covered, condition)
    }

    fn correctly_covered(&self, condition: &Condition, label: &Label) -> Result<RoaringBitmap> {
        self.lookup(Query::CorrectlyCovered(label), condition)
    }

    fn incorrectly_covered(&self, condition: &Condition, label: &Label) -> Result<RoaringBitmap> {
        self.lookup(Query::IncorrectlyCovered(label), condition)
    }

    fn correctly_not_covered(
        &self,
        condition: &Condition,
        label: &Label,
    ) -> Result<RoaringBitmap> {
        self.lookup(Query::CorrectlyNotCovered(label), condition)
    }

    fn incorrectly_not_covered(
        &self,
        condition: &Condition,
        label: &Label,
    ) -> Result<RoaringBitmap> {
        self.lookup(Query::IncorrectlyNotCovered(label), condition)
    }

    fn minimal_cover(&self, condition: &Condition, label: &Label) -> Result<MinimalCover> {
        Ok(MinimalCover {
            covered: self.covered(condition)?,
            correctly_covered: self.correctly_covered(condition, label)?,
            incorrectly_not_covered: self.incorrectly_not_covered(condition, label)?,
        })
    }
}
