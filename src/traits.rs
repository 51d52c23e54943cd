//! Traits for comparison plugins and object flattening

use std::sync::Arc;

use crate::types::*;

/// Flat `(key, value)` pairs produced from one object
pub type FlatValues = Vec<(String, Option<Value>)>;

/// A single comparison strategy.
///
/// The reconciler asks each configured plugin in turn whether it can compare
/// a pair of values. A plugin that does not understand the dynamic types it is
/// given answers `UnableToCompare` and the next plugin is consulted; it must
/// not panic because of a type mismatch.
pub trait ComparisonPlugin: Send + Sync {
    /// Compare the values supplied for `key`. Either side may be missing.
    fn try_compare(&self, key: &str, expected: Option<&Value>, actual: Option<&Value>)
        -> PluginResult;
}

impl<P: ComparisonPlugin + ?Sized> ComparisonPlugin for Box<P> {
    fn try_compare(
        &self,
        key: &str,
        expected: Option<&Value>,
        actual: Option<&Value>,
    ) -> PluginResult {
        (**self).try_compare(key, expected, actual)
    }
}

impl<P: ComparisonPlugin + ?Sized> ComparisonPlugin for Arc<P> {
    fn try_compare(
        &self,
        key: &str,
        expected: Option<&Value>,
        actual: Option<&Value>,
    ) -> PluginResult {
        (**self).try_compare(key, expected, actual)
    }
}

/// Converts a structured object into flat key-value pairs.
///
/// Implementations must be deterministic for a given object and must produce
/// unique keys; nested structures are expected to use prefixed keys such as
/// `address.city`.
pub trait Flattener<T: ?Sized> {
    fn flatten(&self, root_key: Option<&str>, object: &T) -> ReconcileResult<FlatValues>;
}

impl<T: ?Sized, F: Flattener<T> + ?Sized> Flattener<T> for &F {
    fn flatten(&self, root_key: Option<&str>, object: &T) -> ReconcileResult<FlatValues> {
        (**self).flatten(root_key, object)
    }
}

/// Adapts a closure to the [`Flattener`] trait
pub struct FnFlattener<F> {
    flatten_fn: F,
}

impl<F> FnFlattener<F> {
    pub fn new(flatten_fn: F) -> Self {
        Self { flatten_fn }
    }
}

impl<T: ?Sized, F> Flattener<T> for FnFlattener<F>
where
    F: Fn(Option<&str>, &T) -> ReconcileResult<FlatValues>,
{
    fn flatten(&self, root_key: Option<&str>, object: &T) -> ReconcileResult<FlatValues> {
        (self.flatten_fn)(root_key, object)
    }
}
