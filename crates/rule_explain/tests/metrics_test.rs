//! RMI and Jaccard metrics.

mod common;

use common::*;
use rule_explain::prelude::*;

const EPS: f64 = 1e-12;

#[test]
fn rmi_sign_follows_independence() {
    // Above independence: TP * N = 100 > covered * positive = 50
    assert!(calculate_rmi(&ConfusionMatrix::new(5, 0, 5, 10)) > 0.0);
    // Exactly independent
    assert_eq!(calculate_rmi(&ConfusionMatrix::new(5, 5, 5, 5)), 0.0);
    // Below independence: 20 < 100
    assert!(calculate_rmi(&ConfusionMatrix::new(1, 9, 9, 1)) < 0.0);
    // Degenerate tables
    assert_eq!(calculate_rmi(&ConfusionMatrix::default()), 0.0);
    assert_eq!(calculate_rmi(&ConfusionMatrix::new(0, 0, 10, 10)), 0.0);
}

#[test]
fn rmi_is_symmetric_in_magnitude() {
    let good = calculate_rmi(&ConfusionMatrix::new(10, 0, 0, 10));
    let bad = calculate_rmi(&ConfusionMatrix::new(0, 10, 10, 0));
    assert!((good + bad).abs() < EPS);
}

/// RMI sums over counts, so a perfect rule on a balanced label scores
/// `rows * ln 2` rather than `ln 2`.
#[test]
fn rmi_is_measured_over_counts() {
    let perfect = calculate_rmi(&ConfusionMatrix::new(10, 0, 0, 10));
    assert!((perfect - 20.0 * std::f64::consts::LN_2).abs() < 1e-9);

    // 1 of 10 positives covered alone among 20 rows
    let expected = 1.0 * (20.0_f64 / 10.0).ln()
        + 9.0 * (9.0 * 20.0 / (19.0 * 10.0_f64)).ln()
        + 10.0 * (10.0 * 20.0 / (19.0 * 10.0_f64)).ln();
    let single = calculate_rmi(&ConfusionMatrix::new(1, 0, 9, 10));
    assert!((single - expected).abs() < 1e-9);
}

#[test]
fn max_rmi_is_rows_times_the_label_entropy() {
    assert!((max_rmi(10, 20) - 20.0 * std::f64::consts::LN_2).abs() < 1e-9);
    let entropy = -(0.25_f64 * 0.25_f64.ln() + 0.75 * 0.75_f64.ln());
    assert!((max_rmi(5, 20) - 20.0 * entropy).abs() < 1e-9);
    assert_eq!(max_rmi(0, 20), 0.0);
    assert_eq!(max_rmi(20, 20), 0.0);
}

#[test]
fn scaled_rmi_normalizes_and_penalizes() {
    let perfect = ConfusionMatrix::new(10, 0, 0, 10);
    let max = max_rmi(10, 20);
    assert!((scaled_rmi(&perfect, max, 0, 0.1) - 1.0).abs() < EPS);
    assert!((scaled_rmi(&perfect, max, 2, 0.1) - 0.8).abs() < EPS);
    // No information to gain: only the penalty remains
    assert!((scaled_rmi(&perfect, 0.0, 3, 0.1) + 0.3).abs() < EPS);
}

#[test]
fn rule_rmi_uses_rule_statistics() {
    let ds = fixture();
    let factory = eager_factory(&ds);
    let rule = factory
        .rule_factory()
        .initialize(condition(&ds, &[("f0", &["a"])]), label(&ds, "yes"))
        .unwrap();
    let expected = calculate_rmi(&ConfusionMatrix::new(1, 0, 9, 10));
    assert_eq!(rule_rmi(&rule).unwrap(), expected);
    assert!(expected > 0.0);
}

// ----------------------------------------------------------------------------
// Jaccard
// ----------------------------------------------------------------------------

#[test]
fn jaccard_of_overlapping_rules() {
    let ds = fixture();
    let factory = eager_factory(&ds);
    let rules = factory.rule_factory();
    let yes = label(&ds, "yes");
    // lo: rows 0..10, r0: {0, 4, 8, 12, 16} -> |∩| = 3, |∪| = 12
    let lo = rules
        .initialize(condition(&ds, &[("f3", &["lo"])]), yes.clone())
        .unwrap();
    let r0 = rules
        .initialize(condition(&ds, &[("f2", &["r0"])]), yes)
        .unwrap();

    assert!((jaccard_similarity(&lo, &r0).unwrap() - 0.25).abs() < EPS);
    assert!((jaccard_dissimilarity(&lo, &r0).unwrap() - 0.75).abs() < EPS);
    assert_eq!(jaccard_similarity(&lo, &lo).unwrap(), 1.0);
}

#[test]
fn jaccard_of_disjoint_and_empty_rules() {
    let ds = fixture();
    let factory = eager_factory(&ds);
    let rules = factory.rule_factory();
    let yes = label(&ds, "yes");
    let p = rules
        .initialize(condition(&ds, &[("f1", &["p"])]), yes.clone())
        .unwrap();
    let q = rules
        .initialize(condition(&ds, &[("f1", &["q"])]), yes.clone())
        .unwrap();
    assert_eq!(jaccard_similarity(&p, &q).unwrap(), 0.0);

    let empty_a = rules.initialize(Condition::new(), yes.clone()).unwrap();
    let empty_b = rules.initialize(Condition::new(), yes).unwrap();
    assert_eq!(jaccard_similarity(&empty_a, &empty_b).unwrap(), 1.0);
}

#[test]
fn jaccard_across_datasets_is_rejected() {
    let ds = fixture();
    let other = ds.select_rows(&[0, 1, 2]).unwrap();
    let yes = label(&ds, "yes");
    let c = condition(&ds, &[("f1", &["p"])]);
    let a = eager_factory(&ds)
        .rule_factory()
        .initialize(c.clone(), yes.clone())
        .unwrap();
    let b = eager_factory(&other)
        .rule_factory()
        .initialize(c, yes)
        .unwrap();

    assert!(matches!(
        jaccard_similarity(&a, &b),
        Err(Error::IllegalCombination(_))
    ));
}
