//! Conjunctive conditions over categorical features.
//!
//! A [`Condition`] maps each constrained feature to the set of codes it may
//! take. Codes of one feature are OR'd, features are AND'd. A condition with no
//! features, or with a feature mapped to an empty set, matches no rows: it is an
//! unspecified rule, not a universal one.

use crate::error::{Error, Result};
use crate::feature::Feature;
use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Condition {
    terms: BTreeMap<Feature, BTreeSet<u32>>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a condition, checking every code against its feature's domain.
    pub fn from_terms<I, C>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Feature, C)>,
        C: IntoIterator<Item = u32>,
    {
        let mut condition = Self::new();
        for (feature, codes) in terms {
            condition = condition.with(feature, codes)?;
        }
        Ok(condition)
    }

    /// Single-feature condition from value names.
    pub fn from_values(feature: &Feature, values: &[&str]) -> Result<Self> {
        let codes = values
            .iter()
            .map(|v| feature.code_of(v))
            .collect::<Result<BTreeSet<u32>>>()?;
        Ok(Self::single(feature.clone(), codes))
    }

    pub(crate) fn single(feature: Feature, codes: BTreeSet<u32>) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(feature, codes);
        Self { terms }
    }

    /// Returns a copy with `codes` added to the feature's value set.
    pub fn with<C>(&self, feature: Feature, codes: C) -> Result<Self>
    where
        C: IntoIterator<Item = u32>,
    {
        let mut terms = self.terms.clone();
        let entry = terms.entry(feature.clone()).or_default();
        for code in codes {
            if !feature.contains_code(code) {
                return Err(Error::value_not_found(feature.name(), code));
            }
            entry.insert(code);
        }
        Ok(Self { terms })
    }

    /// Returns a copy with the feature's term removed.
    pub fn without(&self, feature: &Feature) -> Self {
        let mut terms = self.terms.clone();
        terms.remove(feature);
        Self { terms }
    }

    /// The single-feature condition made of this condition's term for `feature`.
    pub fn only(&self, feature: &Feature) -> Self {
        match self.terms.get_key_value(feature) {
            Some((f, codes)) => Self::single(f.clone(), codes.clone()),
            None => Self::new(),
        }
    }

    pub fn get(&self, feature: &Feature) -> Option<&BTreeSet<u32>> {
        self.terms.get(feature)
    }

    pub fn contains(&self, feature: &Feature, code: u32) -> bool {
        self.terms
            .get(feature)
            .map(|codes| codes.contains(&code))
            .unwrap_or(false)
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.terms.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Feature, &BTreeSet<u32>)> {
        self.terms.iter()
    }

    /// Every `(feature, code)` pair, in feature then code order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Feature, u32)> {
        self.terms
            .iter()
            .flat_map(|(f, codes)| codes.iter().map(move |&c| (f, c)))
    }

    /// Number of constrained features.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Total number of condition values across features.
    pub fn value_count(&self) -> usize {
        self.terms.values().map(BTreeSet::len).sum()
    }

    /// Whether a row, given as a code lookup per feature, satisfies the condition.
    pub fn matches<F>(&self, mut code_of: F) -> bool
    where
        F: FnMut(&Feature) -> Option<u32>,
    {
        if self.terms.is_empty() {
            return false;
        }
        self.terms.iter().all(|(feature, codes)| match code_of(feature) {
            Some(code) => codes.contains(&code),
            None => false,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "<unspecified>");
        }
        let parts: Vec<String> = self
            .terms
            .iter()
            .map(|(feature, codes)| {
                let values: Vec<String> =
                    codes.iter().map(|&c| feature.display_value(c)).collect();
                if values.len() == 1 {
                    format!("{} = {}", feature.name(), values[0])
                } else {
                    format!("{} in {{{}}}", feature.name(), values.join(", "))
                }
            })
            .collect();
        write!(f, "{}", parts.join(" AND "))
    }
}
