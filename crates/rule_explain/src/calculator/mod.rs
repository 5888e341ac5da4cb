//! Cover calculators.
//!
//! [`CoverCalculator`] is the count contract every rule and rule set is
//! evaluated through. [`BitmapCalculator`] extends it with the row bitmaps of
//! each confusion cell; the caching decorators in [`crate::cache`] wrap any
//! bitmap calculator and are themselves bitmap calculators.
//!
//! ```text
//!   covered                 = cover(c)
//!   correctly_covered       = cover(c) AND label
//!   incorrectly_covered     = cover(c) AND NOT label
//!   correctly_not_covered   = NOT cover(c) AND NOT label
//!   incorrectly_not_covered = label AND NOT cover(c)
//! ```

mod index;
mod scan;

pub use index::IndexCalculator;
pub use scan::ScanCalculator;

use crate::condition::Condition;
use crate::dataset::DatasetId;
use crate::error::Result;
use crate::feature::Label;
use core::fmt;
use roaring::RoaringBitmap;

/// The 2x2 contingency table of a rule against its label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_negative: u64,
}

impl ConfusionMatrix {
    pub fn new(
        true_positive: u64,
        false_positive: u64,
        false_negative: u64,
        true_negative: u64,
    ) -> Self {
        Self {
            true_positive,
            false_positive,
            false_negative,
            true_negative,
        }
    }

    /// Derives the four cells from `|covered|`, `TP`, `FN` and the row count.
    pub fn from_minimal(covered: u64, true_positive: u64, false_negative: u64, rows: u64) -> Self {
        Self {
            true_positive,
            false_positive: covered.saturating_sub(true_positive),
            false_negative,
            true_negative: rows.saturating_sub(covered).saturating_sub(false_negative),
        }
    }

    pub fn covered(&self) -> u64 {
        self.true_positive + self.false_positive
    }

    pub fn label_count(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    fn ratio(num: u64, den: u64) -> f64 {
        if den == 0 {
            0.0
        } else {
            num as f64 / den as f64
        }
    }

    /// Fraction of rows covered.
    pub fn coverage(&self) -> f64 {
        Self::ratio(self.covered(), self.total())
    }

    pub fn precision(&self) -> f64 {
        Self::ratio(self.true_positive, self.covered())
    }

    pub fn recall(&self) -> f64 {
        Self::ratio(self.true_positive, self.label_count())
    }

    pub fn accuracy(&self) -> f64 {
        Self::ratio(self.true_positive + self.true_negative, self.total())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP={} FP={} FN={} TN={}",
            self.true_positive, self.false_positive, self.false_negative, self.true_negative
        )
    }
}

/// The three bitmaps from which every confusion cell can be derived.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimalCover {
    pub covered: RoaringBitmap,
    pub correctly_covered: RoaringBitmap,
    pub incorrectly_not_covered: RoaringBitmap,
}

impl MinimalCover {
    pub fn confusion(&self, rows: u64) -> ConfusionMatrix {
        ConfusionMatrix::from_minimal(
            self.covered.len(),
            self.correctly_covered.len(),
            self.incorrectly_not_covered.len(),
            rows,
        )
    }
}

pub trait CoverCalculator: Send + Sync {
    fn dataset_id(&self) -> DatasetId;

    fn row_count(&self) -> u64;

    fn label_count(&self, label: &Label) -> Result<u64>;

    fn confusion(&self, condition: &Condition, label: &Label) -> Result<ConfusionMatrix>;

    /// Confusion of the disjunction of `conditions` (a row is covered if any
    /// condition covers it).
    fn confusion_any(&self, conditions: &[&Condition], label: &Label) -> Result<ConfusionMatrix>;
}

pub trait BitmapCalculator: CoverCalculator {
    fn label_rows(&self, label: &Label) -> Result<RoaringBitmap>;

    fn covered(&self, condition: &Condition) -> Result<RoaringBitmap>;

    fn correctly_covered(&self, condition: &Condition, label: &Label) -> Result<RoaringBitmap>;

    fn incorrectly_covered(&self, condition: &Condition, label: &Label) -> Result<RoaringBitmap>;

    fn correctly_not_covered(&self, condition: &Condition, label: &Label)
        -> Result<RoaringBitmap>;

    fn incorrectly_not_covered(
        &self,
        condition: &Condition,
        label: &Label,
    ) -> Result<RoaringBitmap>;

    fn minimal_cover(&self, condition: &Condition, label: &Label) -> Result<MinimalCover> {
        Ok(MinimalCover {
            covered: self.covered(condition)?,
            correctly_covered: self.correctly_covered(condition, label)?,
            incorrectly_not_covered: self.incorrectly_not_covered(condition, label)?,
        })
    }
}

// Count-contract helpers shared by every bitmap calculator

pub(crate) fn bitmap_confusion<C>(
    calc: &C,
    condition: &Condition,
    label: &Label,
) -> Result<ConfusionMatrix>
where
    C: BitmapCalculator + ?Sized,
{
    Ok(calc.minimal_cover(condition, label)?.confusion(calc.row_count()))
}

pub(crate) fn bitmap_confusion_any<C>(
    calc: &C,
    conditions: &[&Condition],
    label: &Label,
) -> Result<ConfusionMatrix>
where
    C: BitmapCalculator + ?Sized,
{
    let mut covered = RoaringBitmap::new();
    for condition in conditions {
        covered |= calc.covered(condition)?;
    }
    let label_rows = calc.label_rows(label)?;
    let true_positive = covered.intersection_len(&label_rows);
    let false_negative = label_rows.len() - true_positive;
    Ok(ConfusionMatrix::from_minimal(
        covered.len(),
        true_positive,
        false_negative,
        calc.row_count(),
    ))
}
