//! Calculator contracts: confusion cells partition the rows, the minimal cover
//! agrees with the full cells, and the scan calculator agrees with the index.

mod common;

use std::sync::Arc;

use common::*;
use proptest::prelude::*;
use rule_explain::prelude::*;

const NAMES: [&str; 5] = ["f0", "f1", "f2", "f3", "f4"];

/// Builds a condition from per-feature bit masks over each domain. A zero mask
/// leaves the feature unconstrained.
fn masked_condition(ds: &CategoricalDataset, masks: &[u8]) -> Condition {
    let mut condition = Condition::new();
    for (name, &mask) in NAMES.iter().zip(masks) {
        let f = feature(ds, name);
        let codes: Vec<u32> = (0..f.cardinality() as u32)
            .filter(|&c| mask & (1u8 << c) != 0)
            .collect();
        if !codes.is_empty() {
            condition = condition.with(f, codes).expect("condition");
        }
    }
    condition
}

fn masks() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..32, 5)
}

proptest! {
    #[test]
    fn cells_partition_every_row(masks in masks(), positive in any::<bool>()) {
        let ds = fixture();
        let calc = index_calculator(&ds);
        let c = masked_condition(&ds, &masks);
        let l = label(&ds, if positive { "yes" } else { "no" });

        let covered = calc.covered(&c).unwrap();
        let cc = calc.correctly_covered(&c, &l).unwrap();
        let ic = calc.incorrectly_covered(&c, &l).unwrap();
        let cnc = calc.correctly_not_covered(&c, &l).unwrap();
        let inc = calc.incorrectly_not_covered(&c, &l).unwrap();

        prop_assert_eq!(&cc | &ic, covered.clone());
        prop_assert!((&cc & &ic).is_empty());
        prop_assert!((&covered & &cnc).is_empty());
        prop_assert!((&covered & &inc).is_empty());
        prop_assert_eq!(cc.len() + ic.len() + cnc.len() + inc.len(), ROWS as u64);
        prop_assert_eq!(&cc | &inc, calc.label_rows(&l).unwrap());
    }

    /// Cell counts close over the rows for every calculator and every stack of
    /// caching decorators.
    #[test]
    fn closure_holds_for_every_calculator(masks in masks(), positive in any::<bool>()) {
        let ds = fixture();
        let config = CacheConfig::default();
        let calculators: Vec<Box<dyn CoverCalculator>> = vec![
            Box::new(index_calculator(&ds)),
            Box::new(ScanCalculator::new(Arc::new(ds.clone()))),
            Box::new(CachedCalculator::new(index_calculator(&ds), config.clone())),
            Box::new(SubsetCachedCalculator::new(index_calculator(&ds), config.clone())),
            Box::new(SubsetCachedCalculator::new(
                CachedCalculator::new(index_calculator(&ds), config.clone()),
                config,
            )),
        ];
        let c = masked_condition(&ds, &masks);
        let l = label(&ds, if positive { "yes" } else { "no" });

        let index = index_calculator(&ds);
        let covered = index.covered(&c).unwrap().len();
        let reference = index.confusion(&c, &l).unwrap();
        for calc in &calculators {
            let m = calc.confusion(&c, &l).unwrap();
            prop_assert_eq!(m.true_positive + m.false_positive, covered);
            prop_assert_eq!(m.true_positive + m.false_negative, calc.label_count(&l).unwrap());
            prop_assert_eq!(m.total(), ROWS as u64);
            prop_assert_eq!(m, reference);
        }
    }

    #[test]
    fn minimal_cover_matches_full_cells(masks in masks()) {
        let ds = fixture();
        let calc = index_calculator(&ds);
        let c = masked_condition(&ds, &masks);
        let l = label(&ds, "yes");

        let matrix = calc.minimal_cover(&c, &l).unwrap().confusion(ROWS as u64);
        prop_assert_eq!(matrix.true_positive, calc.correctly_covered(&c, &l).unwrap().len());
        prop_assert_eq!(matrix.false_positive, calc.incorrectly_covered(&c, &l).unwrap().len());
        prop_assert_eq!(matrix.false_negative, calc.incorrectly_not_covered(&c, &l).unwrap().len());
        prop_assert_eq!(matrix.true_negative, calc.correctly_not_covered(&c, &l).unwrap().len());
        prop_assert_eq!(matrix, calc.confusion(&c, &l).unwrap());
    }

    #[test]
    fn scan_agrees_with_index(a in masks(), b in masks()) {
        let ds = fixture();
        let index = index_calculator(&ds);
        let scan = ScanCalculator::new(Arc::new(ds.clone()));
        let ca = masked_condition(&ds, &a);
        let cb = masked_condition(&ds, &b);
        let l = label(&ds, "no");

        prop_assert_eq!(scan.confusion(&ca, &l).unwrap(), index.confusion(&ca, &l).unwrap());
        prop_assert_eq!(
            scan.confusion_any(&[&ca, &cb], &l).unwrap(),
            index.confusion_any(&[&ca, &cb], &l).unwrap()
        );
    }

    #[test]
    fn union_confusion_covers_the_union(a in masks(), b in masks()) {
        let ds = fixture();
        let calc = index_calculator(&ds);
        let ca = masked_condition(&ds, &a);
        let cb = masked_condition(&ds, &b);
        let l = label(&ds, "yes");

        let union = calc.covered(&ca).unwrap() | calc.covered(&cb).unwrap();
        let matrix = calc.confusion_any(&[&ca, &cb], &l).unwrap();
        prop_assert_eq!(matrix.covered(), union.len());
        prop_assert_eq!(matrix.total(), ROWS as u64);
    }
}

// ----------------------------------------------------------------------------
// Fixed cases
// ----------------------------------------------------------------------------

/// Querying the whole domain of `f1` covers everything, leaving nothing
/// correctly uncovered for either label value.
#[test]
fn full_range_condition_leaves_nothing_uncovered() {
    let ds = fixture();
    let calc = index_calculator(&ds);
    let c = condition(&ds, &[("f1", &["p", "q"])]);

    assert_eq!(calc.covered(&c).unwrap().len(), ROWS as u64);
    for value in ["yes", "no"] {
        let l = label(&ds, value);
        assert!(calc.correctly_not_covered(&c, &l).unwrap().is_empty());
        assert!(calc.incorrectly_not_covered(&c, &l).unwrap().is_empty());
    }
}

#[test]
fn confusion_of_a_known_rule() {
    let ds = fixture();
    let calc = index_calculator(&ds);
    // f3 = lo covers rows 0..10: five even (yes) and five odd (no)
    let c = condition(&ds, &[("f3", &["lo"])]);
    let matrix = calc.confusion(&c, &label(&ds, "yes")).unwrap();
    assert_eq!(matrix, ConfusionMatrix::new(5, 5, 5, 5));
    assert_eq!(matrix.precision(), 0.5);
    assert_eq!(matrix.coverage(), 0.5);
    assert_eq!(calc.label_count(&label(&ds, "yes")).unwrap(), 10);
}

#[test]
fn empty_condition_has_zero_cover_in_both_calculators() {
    let ds = fixture();
    let index = index_calculator(&ds);
    let scan = ScanCalculator::new(Arc::new(ds.clone()));
    let l = label(&ds, "yes");
    let expected = ConfusionMatrix::new(0, 0, 10, 10);

    assert_eq!(index.confusion(&Condition::new(), &l).unwrap(), expected);
    assert_eq!(scan.confusion(&Condition::new(), &l).unwrap(), expected);
}
