//! Grouping of objects by composite key and bucket classification

use std::collections::HashMap;

use tracing::debug;

use super::key::CompositeKey;
use super::result::*;
use crate::types::*;

/// All objects from both sides sharing one key
struct Bucket<T> {
    expected: Vec<T>,
    actual: Vec<T>,
}

impl<T> Default for Bucket<T> {
    fn default() -> Self {
        Self {
            expected: Vec::new(),
            actual: Vec::new(),
        }
    }
}

/// Buckets in the order their keys were first seen
struct Buckets<T> {
    positions: HashMap<CompositeKey, usize>,
    ordered: Vec<(CompositeKey, Bucket<T>)>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            positions: HashMap::new(),
            ordered: Vec::new(),
        }
    }
}

impl<T> Buckets<T> {
    fn entry(&mut self, key: CompositeKey) -> &mut Bucket<T> {
        let position = match self.positions.get(&key) {
            Some(position) => *position,
            None => {
                let position = self.ordered.len();
                self.positions.insert(key.clone(), position);
                self.ordered.push((key, Bucket::default()));
                position
            }
        };
        &mut self.ordered[position].1
    }

    fn len(&self) -> usize {
        self.ordered.len()
    }
}

enum BucketClass<T> {
    Incomparable(IncomparableGroup<T>),
    Additional(T),
    Missing(T),
    Pair(T, T),
}

impl<T> Bucket<T> {
    /// `None` only for a bucket with no objects at all
    fn into_class(mut self) -> Option<BucketClass<T>> {
        if self.expected.len() > 1 || self.actual.len() > 1 {
            return Some(BucketClass::Incomparable(IncomparableGroup {
                expected_objects: self.expected,
                actual_objects: self.actual,
            }));
        }

        match (self.expected.pop(), self.actual.pop()) {
            (None, Some(actual)) => Some(BucketClass::Additional(actual)),
            (Some(expected), None) => Some(BucketClass::Missing(expected)),
            (Some(expected), Some(actual)) => Some(BucketClass::Pair(expected, actual)),
            (None, None) => None,
        }
    }
}

/// Bucket both collections by key, then classify every bucket.
///
/// `key_fn` receives each object's position within its own collection.
/// `compare_fn` runs once per one-to-one bucket; its first error aborts.
pub(crate) fn reconcile_buckets<T, P, E, A, K, C>(
    mut key_fn: K,
    mut compare_fn: C,
    expected: E,
    actual: A,
) -> ReconcileResult<SetReconciliationResult<T, P>>
where
    E: IntoIterator<Item = T>,
    A: IntoIterator<Item = T>,
    K: FnMut(usize, &T) -> CompositeKey,
    C: FnMut(&CompositeKey, &T, &T) -> ReconcileResult<PairOutcome<P>>,
{
    let mut buckets = Buckets::default();
    let mut expected_count = 0;
    for (index, object) in expected.into_iter().enumerate() {
        let key = key_fn(index, &object);
        buckets.entry(key).expected.push(object);
        expected_count += 1;
    }

    let mut actual_count = 0;
    for (index, object) in actual.into_iter().enumerate() {
        let key = key_fn(index, &object);
        buckets.entry(key).actual.push(object);
        actual_count += 1;
    }

    debug!(
        expected = expected_count,
        actual = actual_count,
        keys = buckets.len(),
        "bucketed collections"
    );

    let mut result = SetReconciliationResult::new();
    for (key, bucket) in buckets.ordered {
        match bucket.into_class() {
            Some(BucketClass::Incomparable(group)) => {
                result.incomparable.insert(key, group);
            }
            Some(BucketClass::Additional(actual)) => {
                result.additional_keys.insert(key, actual);
            }
            Some(BucketClass::Missing(expected)) => {
                result.missing_keys.insert(key, expected);
            }
            Some(BucketClass::Pair(expected, actual)) => {
                match compare_fn(&key, &expected, &actual)? {
                    PairOutcome::Matched => {
                        result.matching.insert(key, MatchedPair { expected, actual });
                    }
                    PairOutcome::Differing(payload) => {
                        result.differing.insert(
                            key,
                            DifferingPair {
                                expected,
                                actual,
                                payload,
                            },
                        );
                    }
                }
            }
            None => {}
        }
    }

    let summary = result.summary();
    debug!(
        matching = summary.matching,
        differing = summary.differing,
        missing = summary.missing,
        additional = summary.additional,
        incomparable = summary.incomparable,
        "classified buckets"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_value(_: usize, value: &i32) -> CompositeKey {
        CompositeKey::single("value", *value)
    }

    fn never_differs(_: &CompositeKey, _: &i32, _: &i32) -> ReconcileResult<PairOutcome<()>> {
        Ok(PairOutcome::Matched)
    }

    #[test]
    fn test_classification() {
        let result = reconcile_buckets(by_value, never_differs, vec![1, 2, 3, 3], vec![1, 3, 4])
            .unwrap();

        assert_eq!(result.matching.len(), 1);
        assert_eq!(result.missing_keys.get(&CompositeKey::single("value", 2i32)), Some(&2));
        assert_eq!(result.additional_keys.get(&CompositeKey::single("value", 4i32)), Some(&4));

        let group = &result.incomparable[&CompositeKey::single("value", 3i32)];
        assert_eq!(group.expected_objects, vec![3, 3]);
        assert_eq!(group.actual_objects, vec![3]);
    }

    #[test]
    fn test_duplicates_without_counterpart_are_incomparable() {
        let result = reconcile_buckets(by_value, never_differs, vec![], vec![5, 5]).unwrap();
        assert!(result.additional_keys.is_empty());
        assert_eq!(result.incomparable.len(), 1);
    }

    #[test]
    fn test_key_fn_sees_positions() {
        let mut seen = Vec::new();
        reconcile_buckets(
            |index, value: &i32| {
                seen.push(index);
                CompositeKey::single("value", *value)
            },
            never_differs,
            vec![10, 20],
            vec![30],
        )
        .unwrap();
        assert_eq!(seen, vec![0, 1, 0]);
    }

    #[test]
    fn test_compare_error_aborts() {
        let result = reconcile_buckets(
            by_value,
            |key: &CompositeKey, _: &i32, _: &i32| -> ReconcileResult<PairOutcome<()>> {
                Err(ReconcileError::NoAvailablePlugin(key.to_string()))
            },
            vec![1],
            vec![1],
        );
        assert!(matches!(result, Err(ReconcileError::NoAvailablePlugin(_))));
    }

    #[test]
    fn test_first_failing_pair_follows_input_order() {
        for _ in 0..10 {
            let result = reconcile_buckets(
                by_value,
                |key: &CompositeKey, _: &i32, _: &i32| -> ReconcileResult<PairOutcome<()>> {
                    Err(ReconcileError::NoAvailablePlugin(key.to_string()))
                },
                vec![7, 3, 9, 1],
                vec![1, 9, 3, 7],
            );
            match result {
                Err(ReconcileError::NoAvailablePlugin(key)) => {
                    assert_eq!(key, CompositeKey::single("value", 7i32).to_string());
                }
                _ => panic!("expected the first pair to fail"),
            }
        }
    }
}
