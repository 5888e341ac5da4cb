//! Rules, rule sets and their factories.

mod common;

use std::sync::Arc;

use common::*;
use rule_explain::prelude::*;

fn calculator(ds: &CategoricalDataset) -> Arc<dyn CoverCalculator> {
    Arc::new(index_calculator(ds))
}

#[test]
fn eager_rule_freezes_statistics() {
    let ds = fixture();
    let factory = RuleFactory::eager(calculator(&ds));
    let rule = factory
        .initialize(condition(&ds, &[("f0", &["a"])]), label(&ds, "yes"))
        .unwrap();

    assert!(rule.is_frozen());
    assert_eq!(rule.covered_count().unwrap(), 1);
    assert_eq!(rule.precision().unwrap(), 1.0);
    assert_eq!(rule.value_count(), 1);
    assert_eq!(rule.dataset_id(), ds.id());
    assert_eq!(rule.to_string(), "IF f0 = a THEN y = yes");
}

#[test]
fn lazy_rule_matches_eager_rule() {
    let ds = fixture();
    let calc = calculator(&ds);
    let eager = RuleFactory::eager(Arc::clone(&calc));
    let lazy = RuleFactory::lazy(calc);
    let c = condition(&ds, &[("f2", &["r0", "r2"]), ("f3", &["hi"])]);

    let a = eager.initialize(c.clone(), label(&ds, "no")).unwrap();
    let b = lazy.initialize(c, label(&ds, "no")).unwrap();
    assert!(!b.is_frozen());
    assert_eq!(a, b);
    assert_eq!(a.confusion().unwrap(), b.confusion().unwrap());
}

#[test]
fn translate_to_same_dataset_keeps_statistics() {
    let ds = fixture();
    let calc = calculator(&ds);
    let first = RuleFactory::eager(Arc::clone(&calc));
    // A second calculator over the same dataset
    let second = RuleFactory::eager(Arc::new(CachedCalculator::new(
        index_calculator(&ds),
        CacheConfig::default(),
    )));

    let rule = first
        .initialize(condition(&ds, &[("f3", &["lo"])]), label(&ds, "yes"))
        .unwrap();
    let moved = second.translate_with_data(&rule).unwrap();
    assert_eq!(moved, rule);
    assert!(moved.is_frozen());
    assert_eq!(moved.confusion().unwrap(), rule.confusion().unwrap());
    assert!(Arc::ptr_eq(moved.source(), second.calculator()));
}

#[test]
fn translate_to_other_dataset_recomputes() {
    let ds = fixture();
    // Rows 0..10 only: f3 = lo now covers everything
    let half = ds.select_rows(&(0..10).collect::<Vec<_>>()).unwrap();
    assert_ne!(half.id(), ds.id());

    let full = RuleFactory::eager(calculator(&ds));
    let part = RuleFactory::eager(calculator(&half));
    let rule = full
        .initialize(condition(&ds, &[("f3", &["lo"])]), label(&ds, "yes"))
        .unwrap();
    assert_eq!(rule.covered_count().unwrap(), 10);
    assert_eq!(rule.coverage().unwrap(), 0.5);

    let moved = part.translate_with_data(&rule).unwrap();
    assert_eq!(moved.dataset_id(), half.id());
    assert_eq!(moved.covered_count().unwrap(), 10);
    assert_eq!(moved.coverage().unwrap(), 1.0);
}

// ----------------------------------------------------------------------------
// Rule sets
// ----------------------------------------------------------------------------

#[test]
fn rule_set_cover_is_the_union_of_members() {
    let ds = fixture();
    let factory = eager_factory(&ds);
    let rules = factory.rule_factory();
    let yes = label(&ds, "yes");

    let a = rules
        .initialize(condition(&ds, &[("f2", &["r0"])]), yes.clone())
        .unwrap();
    let b = rules
        .initialize(condition(&ds, &[("f3", &["lo"])]), yes.clone())
        .unwrap();
    let set = factory
        .new_with_collection(yes.clone(), [a.clone(), b.clone()])
        .unwrap();

    // r0: {0,4,8,12,16}; lo: {0..10}
    let matrix = set.confusion().unwrap();
    assert_eq!(matrix.covered(), 12);
    assert_eq!(matrix.true_positive, 7);
    assert_eq!(set.len(), 2);
    assert_eq!(set.value_count(), 2);
    assert!(set.contains(&a));
}

#[test]
fn copy_with_leaves_the_original_untouched() {
    let ds = fixture();
    let factory = eager_factory(&ds);
    let yes = label(&ds, "yes");
    let empty = factory.new_empty(yes.clone());
    let rule = factory
        .rule_factory()
        .initialize(condition(&ds, &[("f0", &["a"])]), yes)
        .unwrap();

    let one = factory.new_copy_with(&empty, rule.clone()).unwrap();
    assert!(empty.is_empty());
    assert_eq!(one.len(), 1);
    // Adding an equal rule keeps set semantics
    let still_one = factory.new_copy_with(&one, rule).unwrap();
    assert_eq!(still_one, one);
}

#[test]
fn union_merges_members() {
    let ds = fixture();
    let factory = eager_factory(&ds);
    let rules = factory.rule_factory();
    let no = label(&ds, "no");
    let r1 = rules
        .initialize(condition(&ds, &[("f1", &["q"])]), no.clone())
        .unwrap();
    let r2 = rules
        .initialize(condition(&ds, &[("f4", &["s1"])]), no.clone())
        .unwrap();

    let a = factory.new_with_collection(no.clone(), [r1.clone()]).unwrap();
    let b = factory.new_with_collection(no.clone(), [r1, r2]).unwrap();
    let union = factory.new_union(&a, &b).unwrap();
    assert_eq!(union, b);
}

#[test]
fn mixing_labels_is_an_illegal_combination() {
    let ds = fixture();
    let factory = eager_factory(&ds);
    let yes_rule = factory
        .rule_factory()
        .initialize(condition(&ds, &[("f0", &["a"])]), label(&ds, "yes"))
        .unwrap();
    let no_set = factory.new_empty(label(&ds, "no"));

    assert!(matches!(
        factory.new_copy_with(&no_set, yes_rule.clone()),
        Err(Error::IllegalCombination(_))
    ));
    assert!(matches!(
        factory.new_with_collection(label(&ds, "no"), [yes_rule]),
        Err(Error::IllegalCombination(_))
    ));
}

#[test]
fn rule_set_translation_rebinds_every_member() {
    let ds = fixture();
    let half = ds.select_rows(&[0, 1, 2, 3]).unwrap();
    let full = eager_factory(&ds);
    let part = eager_factory(&half);
    let yes = label(&ds, "yes");

    let rule = full
        .rule_factory()
        .initialize(condition(&ds, &[("f1", &["p"])]), yes.clone())
        .unwrap();
    let set = full.new_with_collection(yes, [rule]).unwrap();
    let moved = part.translate_with_data(&set).unwrap();

    assert_eq!(moved.dataset_id(), half.id());
    assert_eq!(moved.covered_count().unwrap(), 2);
    for member in moved.iter() {
        assert_eq!(member.dataset_id(), half.id());
    }
}
