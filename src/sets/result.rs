//! Set reconciliation results

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::key::CompositeKey;

/// Outcome of comparing the two objects of a one-to-one bucket
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome<P> {
    Matched,
    Differing(P),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair<T> {
    pub expected: T,
    pub actual: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifferingPair<T, P> {
    pub expected: T,
    pub actual: T,
    /// Field differences or caller-defined payload
    pub payload: P,
}

/// Every object sharing a key that appeared more than once on either side
#[derive(Debug, Clone, PartialEq)]
pub struct IncomparableGroup<T> {
    pub expected_objects: Vec<T>,
    pub actual_objects: Vec<T>,
}

/// Classification of every composite key seen in either collection.
///
/// Each key appears in exactly one of the five maps.
#[derive(Debug, Clone)]
pub struct SetReconciliationResult<T, P> {
    pub matching: HashMap<CompositeKey, MatchedPair<T>>,
    pub differing: HashMap<CompositeKey, DifferingPair<T, P>>,
    /// Keys with an expected object but no actual object
    pub missing_keys: HashMap<CompositeKey, T>,
    /// Keys with an actual object but no expected object
    pub additional_keys: HashMap<CompositeKey, T>,
    pub incomparable: HashMap<CompositeKey, IncomparableGroup<T>>,
}

impl<T, P> Default for SetReconciliationResult<T, P> {
    fn default() -> Self {
        Self {
            matching: HashMap::new(),
            differing: HashMap::new(),
            missing_keys: HashMap::new(),
            additional_keys: HashMap::new(),
            incomparable: HashMap::new(),
        }
    }
}

impl<T, P> SetReconciliationResult<T, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of distinct keys across all classes
    pub fn total_keys(&self) -> usize {
        self.matching.len()
            + self.differing.len()
            + self.missing_keys.len()
            + self.additional_keys.len()
            + self.incomparable.len()
    }

    /// True when every key matched one-to-one without differences
    pub fn is_clean(&self) -> bool {
        self.matching.len() == self.total_keys()
    }

    pub fn summary(&self) -> SetSummary {
        SetSummary {
            total_keys: self.total_keys(),
            matching: self.matching.len(),
            differing: self.differing.len(),
            missing: self.missing_keys.len(),
            additional: self.additional_keys.len(),
            incomparable: self.incomparable.len(),
        }
    }
}

/// Per-class key counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSummary {
    pub total_keys: usize,
    pub matching: usize,
    pub differing: usize,
    pub missing: usize,
    pub additional: usize,
    pub incomparable: usize,
}
