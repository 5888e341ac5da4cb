//! Categorical features and label values.
//!
//! A [`Feature`] carries a name and an ordered value domain. Position `i` of the
//! domain is the dense code `i`, so codes always lie in `[0, K)` for a domain of
//! `K` values. The domain is shared behind an `Arc` so cloning a feature into
//! every condition and rule stays cheap.

use crate::error::{Error, Result};
use core::fmt;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Role of a column in the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
    /// Input column usable in conditions
    Categorical,
    /// Column holding a label (ground truth or black-box prediction)
    Label,
}

#[derive(Clone)]
pub struct Feature {
    kind: FeatureKind,
    name: Arc<str>,
    // Ordered full domain of values; the index is the code
    domain: Arc<Vec<String>>,
    lookup: Arc<HashMap<String, u32>>,
}

impl Feature {
    pub fn new<S, I, V>(kind: FeatureKind, name: S, domain: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        // Deduplicate provided values, preserving first-seen order
        let mut values: Vec<String> = Vec::new();
        let mut lookup: HashMap<String, u32> = HashMap::new();
        for value in domain {
            let value = value.into();
            if !lookup.contains_key(&value) {
                lookup.insert(value.clone(), values.len() as u32);
                values.push(value);
            }
        }
        Self {
            kind,
            name: Arc::from(name.as_ref()),
            domain: Arc::new(values),
            lookup: Arc::new(lookup),
        }
    }

    pub fn categorical<S, I, V>(name: S, domain: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::new(FeatureKind::Categorical, name, domain)
    }

    pub fn label<S, I, V>(name: S, domain: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::new(FeatureKind::Label, name, domain)
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of distinct values `K`.
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn contains_code(&self, code: u32) -> bool {
        (code as usize) < self.domain.len()
    }

    pub fn code_of(&self, value: &str) -> Result<u32> {
        self.lookup
            .get(value)
            .copied()
            .ok_or_else(|| Error::value_not_found(&self.name, value))
    }

    pub fn value_of(&self, code: u32) -> Result<&str> {
        self.domain
            .get(code as usize)
            .map(String::as_str)
            .ok_or_else(|| Error::value_not_found(&self.name, code))
    }

    /// Value name for display purposes; falls back to the raw code.
    pub fn display_value(&self, code: u32) -> String {
        self.domain
            .get(code as usize)
            .cloned()
            .unwrap_or_else(|| format!("{}", code))
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for Feature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Feature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({}, K={})", self.kind, self.name, self.domain.len())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A label feature bound to one of its values.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    feature: Feature,
    code: u32,
}

impl Label {
    pub fn new(feature: Feature, code: u32) -> Result<Self> {
        if !feature.contains_code(code) {
            return Err(Error::value_not_found(feature.name(), code));
        }
        Ok(Self { feature, code })
    }

    pub fn from_value(feature: Feature, value: &str) -> Result<Self> {
        let code = feature.code_of(value)?;
        Ok(Self { feature, code })
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn value(&self) -> String {
        self.feature.display_value(self.code)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.feature.name(), self.value())
    }
}
