//! Rule quality metrics.
//!
//! Rule Mutual Information (RMI) is the mutual information between "covered"
//! and "has the label" over a rule's 2x2 table, signed so that rules whose
//! true positives fall below the count expected under independence score
//! negative. Jaccard metrics compare the covers of two rules.

use crate::calculator::ConfusionMatrix;
use crate::error::{Error, Result};
use crate::rule::Rule;

// cell * ln(cell * total / (row * col)), with 0 ln 0 := 0
fn mi_term(cell: u64, row: u64, col: u64, total: u64) -> f64 {
    if cell == 0 || row == 0 || col == 0 {
        return 0.0;
    }
    let cell = cell as f64;
    cell * (cell * total as f64 / (row as f64 * col as f64)).ln()
}

/// Signed mutual information of the table over counts, in nats. This is
/// `total` times the per-row mutual information.
pub fn calculate_rmi(matrix: &ConfusionMatrix) -> f64 {
    let total = matrix.total();
    if total == 0 {
        return 0.0;
    }
    let covered = matrix.covered();
    let not_covered = total - covered;
    let positive = matrix.label_count();
    let negative = total - positive;

    // Exact comparison of TP against covered * positive / total
    let observed = matrix.true_positive as u128 * total as u128;
    let expected = covered as u128 * positive as u128;
    if observed == expected {
        return 0.0;
    }

    let mi = mi_term(matrix.true_positive, covered, positive, total)
        + mi_term(matrix.false_positive, covered, negative, total)
        + mi_term(matrix.false_negative, not_covered, positive, total)
        + mi_term(matrix.true_negative, not_covered, negative, total);

    if observed < expected {
        // Below independence is strictly negative even when rounding flattens mi
        -mi.max(f64::MIN_POSITIVE)
    } else {
        mi.max(0.0)
    }
}

/// Largest RMI any rule can reach for a label held by `label_count` of `rows`:
/// `rows` times the label entropy, attained by a rule covering exactly its rows.
pub fn max_rmi(label_count: u64, rows: u64) -> f64 {
    let label_count = label_count.min(rows);
    calculate_rmi(&ConfusionMatrix::new(
        label_count,
        0,
        0,
        rows - label_count,
    ))
}

/// RMI normalized to the label's maximum, minus `penalty` per condition value.
pub fn scaled_rmi(matrix: &ConfusionMatrix, max_rmi: f64, value_count: usize, penalty: f64) -> f64 {
    let normalized = if max_rmi > 0.0 {
        calculate_rmi(matrix) / max_rmi
    } else {
        0.0
    };
    normalized - penalty * value_count as f64
}

pub fn rule_rmi(rule: &Rule) -> Result<f64> {
    Ok(calculate_rmi(&rule.confusion()?))
}

/// `|A ∩ B| / |A ∪ B|` of the two rules' covers. Two empty covers count as
/// identical.
///
/// Both rules must come from the same dataset; the cover union is taken
/// through `a`'s calculator.
pub fn jaccard_similarity(a: &Rule, b: &Rule) -> Result<f64> {
    if a.dataset_id() != b.dataset_id() {
        return Err(Error::IllegalCombination(
            "jaccard similarity of rules from different datasets".to_string(),
        ));
    }
    let calc = a.source();
    let covered_a = calc.confusion(a.condition(), a.label())?.covered();
    let covered_b = calc.confusion(b.condition(), a.label())?.covered();
    let union = calc
        .confusion_any(&[a.condition(), b.condition()], a.label())?
        .covered();
    if union == 0 {
        return Ok(1.0);
    }
    let intersection = covered_a + covered_b - union;
    Ok(intersection as f64 / union as f64)
}

pub fn jaccard_dissimilarity(a: &Rule, b: &Rule) -> Result<f64> {
    Ok(1.0 - jaccard_similarity(a, b)?)
}
