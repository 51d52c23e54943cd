//! Plugins that wrap other plugins, closures or value identity

use crate::traits::ComparisonPlugin;
use crate::types::*;

/// Treats two values as equal when they are the same value.
///
/// Both missing, or both present and identical, is `Equal`. Anything else
/// yields the configured outcome, `UnableToCompare` unless changed, so that
/// later plugins still get a chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEqualityPlugin {
    pub not_same_outcome: ComparisonOutcome,
}

impl Default for ReferenceEqualityPlugin {
    fn default() -> Self {
        Self {
            not_same_outcome: ComparisonOutcome::UnableToCompare,
        }
    }
}

impl ReferenceEqualityPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_not_same_outcome(mut self, outcome: ComparisonOutcome) -> Self {
        self.not_same_outcome = outcome;
        self
    }
}

impl ComparisonPlugin for ReferenceEqualityPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        if expected == actual {
            PluginResult::equal()
        } else {
            PluginResult::from_outcome(self.not_same_outcome)
        }
    }
}

type Predicate = dyn Fn(&str, Option<&Value>, Option<&Value>) -> bool + Send + Sync;

/// Delegates to an inner plugin only for pairs accepted by a predicate
pub struct FilterPlugin {
    inner: Box<dyn ComparisonPlugin>,
    predicate: Box<Predicate>,
}

impl FilterPlugin {
    pub fn new<P, F>(inner: P, predicate: F) -> Self
    where
        P: ComparisonPlugin + 'static,
        F: Fn(&str, Option<&Value>, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(inner),
            predicate: Box::new(predicate),
        }
    }

    /// Apply `inner` only to keys starting with `prefix`
    pub fn for_key_prefix<P>(inner: P, prefix: impl Into<String>) -> Self
    where
        P: ComparisonPlugin + 'static,
    {
        let prefix = prefix.into();
        Self::new(inner, move |key: &str, _: Option<&Value>, _: Option<&Value>| {
            key.starts_with(&prefix)
        })
    }
}

impl ComparisonPlugin for FilterPlugin {
    fn try_compare(&self, key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        if (self.predicate)(key, expected, actual) {
            self.inner.try_compare(key, expected, actual)
        } else {
            PluginResult::unable_to_compare()
        }
    }
}

type CompareFn = dyn Fn(&str, Option<&Value>, Option<&Value>) -> PluginResult + Send + Sync;

/// Adapts a closure to the plugin contract
pub struct FunctionPlugin {
    compare_fn: Box<CompareFn>,
}

impl FunctionPlugin {
    pub fn new<F>(compare_fn: F) -> Self
    where
        F: Fn(&str, Option<&Value>, Option<&Value>) -> PluginResult + Send + Sync + 'static,
    {
        Self {
            compare_fn: Box::new(compare_fn),
        }
    }
}

impl ComparisonPlugin for FunctionPlugin {
    fn try_compare(&self, key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        (self.compare_fn)(key, expected, actual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::F64Plugin;
    use crate::plugins::Tolerance;

    #[test]
    fn test_reference_equality() {
        let plugin = ReferenceEqualityPlugin::new();
        let shared = Value::Opaque(OpaqueValue::new("payload"));
        let copy = Value::Opaque(OpaqueValue::new("payload"));

        assert_eq!(plugin.try_compare("k", None, None), PluginResult::equal());
        assert_eq!(
            plugin.try_compare("k", Some(&shared), Some(&shared.clone())),
            PluginResult::equal()
        );
        assert_eq!(
            plugin.try_compare("k", Some(&shared), Some(&copy)),
            PluginResult::unable_to_compare()
        );
        assert_eq!(
            plugin.try_compare("k", Some(&shared), None),
            PluginResult::unable_to_compare()
        );
    }

    #[test]
    fn test_reference_equality_configured_outcome() {
        let plugin = ReferenceEqualityPlugin::new().with_not_same_outcome(ComparisonOutcome::Different);
        assert_eq!(
            plugin.try_compare("k", Some(&Value::I32(1)), Some(&Value::I32(2))),
            PluginResult::different(None)
        );
    }

    #[test]
    fn test_filter_plugin() {
        let loose = F64Plugin::new()
            .with_tolerance(Tolerance::absolute(1.0))
            .unwrap();
        let plugin = FilterPlugin::for_key_prefix(loose, "risk.");

        let a = Value::F64(1.0);
        let b = Value::F64(1.5);
        assert_eq!(
            plugin.try_compare("risk.delta", Some(&a), Some(&b)),
            PluginResult::equal()
        );
        assert_eq!(
            plugin.try_compare("price", Some(&a), Some(&b)),
            PluginResult::unable_to_compare()
        );
    }

    #[test]
    fn test_filter_plugin_sees_values() {
        let plugin = FilterPlugin::new(
            ReferenceEqualityPlugin::new().with_not_same_outcome(ComparisonOutcome::Different),
            |_: &str, expected: Option<&Value>, _: Option<&Value>| expected.is_some(),
        );
        assert_eq!(
            plugin.try_compare("k", None, Some(&Value::I32(1))),
            PluginResult::unable_to_compare()
        );
        assert_eq!(
            plugin.try_compare("k", Some(&Value::I32(1)), None),
            PluginResult::different(None)
        );
    }

    #[test]
    fn test_function_plugin() {
        let plugin = FunctionPlugin::new(|key: &str, _: Option<&Value>, _: Option<&Value>| {
            if key == "ignored" {
                PluginResult::equal()
            } else {
                PluginResult::unable_to_compare()
            }
        });
        assert_eq!(plugin.try_compare("ignored", None, None), PluginResult::equal());
        assert_eq!(
            plugin.try_compare("other", None, None),
            PluginResult::unable_to_compare()
        );
    }
}
