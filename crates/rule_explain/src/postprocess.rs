//! `RuleSet -> RuleSet` filters applied after optimization.

use crate::error::{Error, Result};
use crate::metrics::{jaccard_similarity, rule_rmi};
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

pub trait Postprocessor: Send + Sync {
    fn process(&self, rule_set: &RuleSet) -> Result<RuleSet>;
}

/// Members ordered by descending RMI, ties by rule order.
fn by_rmi(rule_set: &RuleSet) -> Result<Vec<(&Rule, f64)>> {
    let mut scored = rule_set
        .iter()
        .map(|rule| Ok((rule, rule_rmi(rule)?)))
        .collect::<Result<Vec<_>>>()?;
    scored.sort_by(|(ra, a), (rb, b)| b.total_cmp(a).then_with(|| ra.cmp(rb)));
    Ok(scored)
}

fn rebuild<'a>(rule_set: &RuleSet, kept: impl IntoIterator<Item = &'a Rule>) -> RuleSet {
    let members: BTreeSet<Rule> = kept.into_iter().cloned().collect();
    RuleSet::new(
        rule_set.label().clone(),
        members,
        Arc::clone(rule_set.source()),
    )
}

/// Keeps the `k` members with the highest RMI.
#[derive(Clone, Copy, Debug)]
pub struct TopKFilter {
    k: usize,
}

impl TopKFilter {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Postprocessor for TopKFilter {
    fn process(&self, rule_set: &RuleSet) -> Result<RuleSet> {
        let ranked = by_rmi(rule_set)?;
        Ok(rebuild(
            rule_set,
            ranked.into_iter().take(self.k).map(|(rule, _)| rule),
        ))
    }
}

/// Drops near-duplicate rules. Members are visited by descending RMI and a
/// rule is kept only if its Jaccard similarity to every kept rule is at most
/// `max_similarity`.
#[derive(Clone, Copy, Debug)]
pub struct JaccardFilter {
    max_similarity: f64,
}

impl JaccardFilter {
    pub fn new(max_similarity: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&max_similarity) {
            return Err(Error::InvalidConfig(format!(
                "max_similarity must lie in [0, 1], got {max_similarity}"
            )));
        }
        Ok(Self { max_similarity })
    }
}

impl Postprocessor for JaccardFilter {
    fn process(&self, rule_set: &RuleSet) -> Result<RuleSet> {
        let mut kept: Vec<&Rule> = Vec::new();
        for (rule, _) in by_rmi(rule_set)? {
            let mut distinct = true;
            for other in &kept {
                if jaccard_similarity(rule, other)? > self.max_similarity {
                    distinct = false;
                    break;
                }
            }
            if distinct {
                kept.push(rule);
            } else {
                debug!(rule = %rule, "dropped near-duplicate rule");
            }
        }
        Ok(rebuild(rule_set, kept))
    }
}
