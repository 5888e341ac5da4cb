use super::{CacheConfig, CacheStats, CacheStatsSnapshot, MetricCaches, Query};
use crate::calculator::{bitmap_confusion, bitmap_confusion_any};
use crate::calculator::{BitmapCalculator, ConfusionMatrix, CoverCalculator, MinimalCover};
use crate::condition::Condition;
use crate::dataset::DatasetId;
use crate::error::Result;
use crate::feature::Label;
use roaring::RoaringBitmap;
use tracing::trace;

/// Plain bounded cache in front of a bitmap calculator.
pub struct CachedCalculator<C> {
    inner: C,
    caches: MetricCaches,
    stats: CacheStats,
}

impl<C: BitmapCalculator> CachedCalculator<C> {
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
        self.stats.miss();
        trace!(metric = ?query.metric(), %condition, "cache miss");
        let rows = query.run(&self.inner, condition)?;
        cache.insert(condition.clone(), rows.clone());
        Ok(rows)
    }
}

impl<C: BitmapCalculator> CoverCalculator for CachedCalculator<C> {
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

impl<C: BitmapCalculator> BitmapCalculator for CachedCalculator<C> {
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
