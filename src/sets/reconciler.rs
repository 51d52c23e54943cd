//! Reconciliation of two object collections keyed by composite key

use super::bucket::reconcile_buckets;
use super::key::CompositeKey;
use super::result::*;
use crate::reconciler::ValueReconciler;
use crate::traits::Flattener;
use crate::types::*;

/// Reconciles collections by flattening each one-to-one pair and handing the
/// flat values to a [`ValueReconciler`]
pub struct SetReconciler<F> {
    flattener: F,
    reconciler: ValueReconciler,
}

impl<F> SetReconciler<F> {
    pub fn new(flattener: F, reconciler: ValueReconciler) -> Self {
        Self {
            flattener,
            reconciler,
        }
    }

    pub fn flattener(&self) -> &F {
        &self.flattener
    }

    pub fn reconciler(&self) -> &ValueReconciler {
        &self.reconciler
    }

    /// Bucket both collections with `key_fn` and compare every one-to-one
    /// pair field by field. A pair with no differences is matching.
    pub fn reconcile_sets<T, K, E, A>(
        &self,
        key_fn: K,
        expected: E,
        actual: A,
    ) -> ReconcileResult<SetReconciliationResult<T, ReconciliationResult>>
    where
        F: Flattener<T>,
        K: FnMut(usize, &T) -> CompositeKey,
        E: IntoIterator<Item = T>,
        A: IntoIterator<Item = T>,
    {
        reconcile_buckets(
            key_fn,
            |_, expected, actual| {
                let expected_values = self.flattener.flatten(None, expected)?;
                let actual_values = self.flattener.flatten(None, actual)?;
                let differences = self.reconciler.reconcile(expected_values, actual_values)?;

                Ok(if differences.is_empty() {
                    PairOutcome::Matched
                } else {
                    PairOutcome::Differing(differences)
                })
            },
            expected,
            actual,
        )
    }
}

/// Bucket both collections with `key_fn` and let `compare_fn` decide each
/// one-to-one pair. The payload of a differing pair is whatever
/// `compare_fn` returns.
pub fn reconcile_sets_with<T, P, K, C, E, A>(
    key_fn: K,
    mut compare_fn: C,
    expected: E,
    actual: A,
) -> ReconcileResult<SetReconciliationResult<T, P>>
where
    K: FnMut(usize, &T) -> CompositeKey,
    C: FnMut(&T, &T) -> ReconcileResult<PairOutcome<P>>,
    E: IntoIterator<Item = T>,
    A: IntoIterator<Item = T>,
{
    reconcile_buckets(
        key_fn,
        |_, expected, actual| compare_fn(expected, actual),
        expected,
        actual,
    )
}
