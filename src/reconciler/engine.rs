//! Key-by-key reconciliation of two flat value sequences

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::reconciler::policy::*;
use crate::traits::*;
use crate::types::*;

/// Reconciles two flat key-value sequences using an ordered plugin chain.
///
/// Plugin order matters: for every pair of values that are not trivially
/// identical the plugins are consulted front to back and the first one that
/// answers `Equal` or `Different` decides the outcome.
pub struct ValueReconciler {
    plugins: Vec<Box<dyn ComparisonPlugin>>,
    config: ReconcilerConfig,
}

impl Default for ValueReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueReconciler {
    /// Create a reconciler with default policies and no plugins
    pub fn new() -> Self {
        Self::with_config(ReconcilerConfig::default())
    }

    /// Create a reconciler with the given policies and no plugins
    pub fn with_config(config: ReconcilerConfig) -> Self {
        Self {
            plugins: Vec::new(),
            config,
        }
    }

    /// Create a reconciler with the given policies and the standard plugin chain
    pub fn with_standard_plugins(config: ReconcilerConfig) -> Self {
        Self {
            plugins: crate::plugins::standard_plugins(),
            config,
        }
    }

    /// Append a plugin to the end of the chain
    pub fn with_plugin(mut self, plugin: impl ComparisonPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Append a plugin to the end of the chain
    pub fn add_plugin(&mut self, plugin: impl ComparisonPlugin + 'static) -> &mut Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Insert a plugin at the front of the chain so it takes precedence
    pub fn prepend_plugin(&mut self, plugin: impl ComparisonPlugin + 'static) -> &mut Self {
        self.plugins.insert(0, Box::new(plugin));
        self
    }

    pub fn plugins(&self) -> &[Box<dyn ComparisonPlugin>] {
        &self.plugins
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReconcilerConfig) {
        self.config = config;
    }

    /// Reconcile the expected values against the actual values.
    ///
    /// Each input is consumed exactly once. Keys must be unique within each
    /// input; a duplicate is a caller error and aborts the call. Any error
    /// discards the differences collected so far.
    pub fn reconcile<E, A, EK, AK>(
        &self,
        expected: E,
        actual: A,
    ) -> ReconcileResult<ReconciliationResult>
    where
        E: IntoIterator<Item = (EK, Option<Value>)>,
        A: IntoIterator<Item = (AK, Option<Value>)>,
        EK: Into<String>,
        AK: Into<String>,
    {
        let mut expected_values: HashMap<String, Option<Value>> = HashMap::new();
        for (key, value) in expected {
            match expected_values.entry(key.into()) {
                Entry::Occupied(existing) => {
                    return Err(ReconcileError::DuplicateKey {
                        key: existing.key().clone(),
                        side: Side::Expected,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
            }
        }
        let expected_count = expected_values.len();

        let mut differences = ReconciliationResult::new();
        let mut actual_keys: HashSet<String> = HashSet::new();
        for (key, actual_value) in actual {
            let key = key.into();
            if !actual_keys.insert(key.clone()) {
                return Err(ReconcileError::DuplicateKey {
                    key,
                    side: Side::Actual,
                });
            }

            match expected_values.remove(&key) {
                Some(expected_value) => {
                    self.compare_pair(&mut differences, key, expected_value, actual_value)?
                }
                None => self.handle_unmatched(&mut differences, key, Side::Actual, actual_value)?,
            }
        }

        // Whatever is left was never supplied by the actual side
        for (key, expected_value) in expected_values {
            self.handle_unmatched(&mut differences, key, Side::Expected, expected_value)?;
        }

        debug!(
            expected = expected_count,
            actual = actual_keys.len(),
            differences = differences.len(),
            "reconciled value sets"
        );

        Ok(differences)
    }

    fn handle_unmatched(
        &self,
        differences: &mut ReconciliationResult,
        key: String,
        side: Side,
        value: Option<Value>,
    ) -> ReconcileResult<()> {
        match self.config.mismatched_keys {
            MismatchedKeysBehaviour::Ignore => Ok(()),
            MismatchedKeysBehaviour::Throw => Err(ReconcileError::MismatchedKey { key, side }),
            MismatchedKeysBehaviour::ReportAsDifference => {
                let difference = match side {
                    Side::Expected => FieldDifference::expected_only(key, value),
                    Side::Actual => FieldDifference::actual_only(key, value),
                };
                differences.insert(difference);
                Ok(())
            }
            MismatchedKeysBehaviour::TreatMissingValueAsNull => match side {
                Side::Expected => self.compare_pair(differences, key, value, None),
                Side::Actual => self.compare_pair(differences, key, None, value),
            },
        }
    }

    fn compare_pair(
        &self,
        differences: &mut ReconciliationResult,
        key: String,
        expected: Option<Value>,
        actual: Option<Value>,
    ) -> ReconcileResult<()> {
        // Both null, or the very same value
        if expected == actual {
            return Ok(());
        }

        match self.dispatch(&key, expected.as_ref(), actual.as_ref()) {
            Some(result) => {
                if result.outcome == ComparisonOutcome::Different {
                    differences.insert(FieldDifference::new(key, expected, actual, result.payload));
                }
                Ok(())
            }
            None => match self.config.no_available_plugin {
                NoAvailablePluginBehaviour::Ignore => Ok(()),
                NoAvailablePluginBehaviour::Throw => Err(ReconcileError::NoAvailablePlugin(key)),
                NoAvailablePluginBehaviour::ReportAsDifference => {
                    differences.insert(FieldDifference::new(key, expected, actual, None));
                    Ok(())
                }
            },
        }
    }

    /// First plugin result that is not `UnableToCompare`
    fn dispatch(
        &self,
        key: &str,
        expected: Option<&Value>,
        actual: Option<&Value>,
    ) -> Option<PluginResult> {
        for (index, plugin) in self.plugins.iter().enumerate() {
            let result = plugin.try_compare(key, expected, actual);
            if result.outcome != ComparisonOutcome::UnableToCompare {
                trace!(
                    key,
                    plugin = index,
                    expected_type = expected.map(crate::types::Value::type_name),
                    actual_type = actual.map(crate::types::Value::type_name),
                    outcome = ?result.outcome,
                    "plugin claimed values"
                );
                return Some(result);
            }
        }

        trace!(
            key,
            expected_type = expected.map(crate::types::Value::type_name),
            actual_type = actual.map(crate::types::Value::type_name),
            "no plugin claimed values"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::FunctionPlugin;
    use std::sync::{Arc, Mutex};

    type Call = (String, Option<Value>, Option<Value>);

    /// Records every call and answers from a fixed table, `UnableToCompare` otherwise
    struct RecordingPlugin {
        answers: HashMap<String, PluginResult>,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingPlugin {
        fn new(answers: Vec<(&str, PluginResult)>) -> Arc<Self> {
            Arc::new(Self {
                answers: answers
                    .into_iter()
                    .map(|(k, r)| (k.to_string(), r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ComparisonPlugin for RecordingPlugin {
        fn try_compare(
            &self,
            key: &str,
            expected: Option<&Value>,
            actual: Option<&Value>,
        ) -> PluginResult {
            self.calls
                .lock()
                .unwrap()
                .push((key.to_string(), expected.cloned(), actual.cloned()));
            self.answers
                .get(key)
                .cloned()
                .unwrap_or_else(PluginResult::unable_to_compare)
        }
    }

    fn values(pairs: &[(&str, i32)]) -> Vec<(String, Option<Value>)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(Value::I32(*v))))
            .collect()
    }

    fn config(
        mismatched: MismatchedKeysBehaviour,
        no_plugin: NoAvailablePluginBehaviour,
    ) -> ReconcilerConfig {
        ReconcilerConfig::new(mismatched, no_plugin)
    }

    #[test]
    fn test_duplicate_expected_key() {
        let reconciler = ValueReconciler::new();
        let err = reconciler
            .reconcile(values(&[("key1", 2), ("key1", 3)]), values(&[]))
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::DuplicateKey { ref key, side: Side::Expected } if key == "key1"
        ));
    }

    #[test]
    fn test_duplicate_actual_key() {
        let reconciler = ValueReconciler::new();
        let err = reconciler
            .reconcile(values(&[]), values(&[("key1", 2), ("key1", 3)]))
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::DuplicateKey { ref key, side: Side::Actual } if key == "key1"
        ));
    }

    #[test]
    fn test_null_values_match_without_plugins() {
        let reconciler = ValueReconciler::with_config(ReconcilerConfig::strict());
        let result = reconciler
            .reconcile(vec![("key", None)], vec![("key", None)])
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_identical_values_skip_plugins() {
        let plugin = RecordingPlugin::new(vec![]);
        let reconciler =
            ValueReconciler::with_config(ReconcilerConfig::strict()).with_plugin(plugin.clone());

        let result = reconciler
            .reconcile(values(&[("a", 1), ("b", 2)]), values(&[("b", 2), ("a", 1)]))
            .unwrap();

        assert!(result.is_empty());
        assert!(plugin.calls().is_empty());
    }

    #[test]
    fn test_no_plugin_throw() {
        let reconciler = ValueReconciler::with_config(config(
            MismatchedKeysBehaviour::Throw,
            NoAvailablePluginBehaviour::Throw,
        ));
        let err = reconciler
            .reconcile(values(&[("key", 1)]), values(&[("key", 2)]))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::NoAvailablePlugin(ref key) if key == "key"));
    }

    #[test]
    fn test_no_plugin_report_as_difference() {
        let reconciler = ValueReconciler::new();
        let result = reconciler
            .reconcile(
                vec![("key", Some(Value::F64(2.3)))],
                vec![("key", Some(Value::F32(2.4)))],
            )
            .unwrap();

        assert_eq!(result.len(), 1);
        let difference = result.get("key").unwrap();
        assert_eq!(difference.expected_value, Some(Value::F64(2.3)));
        assert_eq!(difference.actual_value, Some(Value::F32(2.4)));
        assert_eq!(difference.payload, None);
    }

    #[test]
    fn test_set_config_replaces_policies() {
        let mut reconciler = ValueReconciler::new();
        reconciler.set_config(
            ReconcilerConfig::default().with_no_available_plugin(NoAvailablePluginBehaviour::Throw),
        );
        assert_eq!(
            reconciler.config().no_available_plugin,
            NoAvailablePluginBehaviour::Throw
        );

        let err = reconciler
            .reconcile(values(&[("key", 1)]), values(&[("key", 2)]))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::NoAvailablePlugin(ref key) if key == "key"));
    }

    #[test]
    fn test_no_plugin_ignore() {
        let reconciler = ValueReconciler::with_config(
            ReconcilerConfig::default().with_no_available_plugin(NoAvailablePluginBehaviour::Ignore),
        );
        let result = reconciler
            .reconcile(
                vec![("key", Some(Value::F64(2.3)))],
                vec![("key", Some(Value::F32(2.4)))],
            )
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_plugin_payload_is_copied() {
        let reconciler = ValueReconciler::new().with_plugin(FunctionPlugin::new(
            |_: &str, _: Option<&Value>, _: Option<&Value>| {
                PluginResult::different(Some(Value::from("why")))
            },
        ));
        let result = reconciler
            .reconcile(values(&[("key", 1)]), values(&[("key", 2)]))
            .unwrap();
        assert_eq!(
            result.get("key").unwrap().payload,
            Some(Value::from("why"))
        );
    }

    #[test]
    fn test_first_claiming_plugin_wins() {
        let first = RecordingPlugin::new(vec![("key", PluginResult::equal())]);
        let second = RecordingPlugin::new(vec![("key", PluginResult::different(None))]);
        let reconciler = ValueReconciler::new()
            .with_plugin(first.clone())
            .with_plugin(second.clone());

        let result = reconciler
            .reconcile(values(&[("key", 1)]), values(&[("key", 2)]))
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(first.calls().len(), 1);
        assert!(second.calls().is_empty());
    }

    #[test]
    fn test_unable_to_compare_falls_through() {
        let first = RecordingPlugin::new(vec![]);
        let second = RecordingPlugin::new(vec![("key", PluginResult::different(None))]);
        let reconciler = ValueReconciler::new()
            .with_plugin(first.clone())
            .with_plugin(second.clone());

        let result = reconciler
            .reconcile(values(&[("key", 1)]), values(&[("key", 2)]))
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(first.calls().len(), 1);
        assert_eq!(second.calls().len(), 1);
    }

    #[test]
    fn test_prepend_plugin_takes_precedence() {
        let mut reconciler = ValueReconciler::new().with_plugin(RecordingPlugin::new(vec![(
            "key",
            PluginResult::different(None),
        )]));
        reconciler.prepend_plugin(RecordingPlugin::new(vec![("key", PluginResult::equal())]));

        let result = reconciler
            .reconcile(values(&[("key", 1)]), values(&[("key", 2)]))
            .unwrap();
        assert!(result.is_empty());
    }

    fn mismatched_cases() -> Vec<(Vec<(String, Option<Value>)>, Vec<(String, Option<Value>)>)> {
        vec![
            (values(&[("val1", 2)]), values(&[("val2", 3)])),
            (values(&[]), values(&[("val2", 3)])),
            (values(&[("val1", 2)]), values(&[])),
        ]
    }

    fn with_matching(extra: Vec<(String, Option<Value>)>) -> Vec<(String, Option<Value>)> {
        let mut all: Vec<(String, Option<Value>)> = (1..=20)
            .map(|i| (i.to_string(), Some(Value::I32(i))))
            .collect();
        all.extend(extra);
        all
    }

    /// Plugin claiming the twenty shared keys as equal, so only mismatched keys matter
    fn matching_plugin() -> FunctionPlugin {
        FunctionPlugin::new(|key: &str, _: Option<&Value>, _: Option<&Value>| {
            match key.parse::<i32>() {
                Ok(_) => PluginResult::equal(),
                Err(_) => PluginResult::unable_to_compare(),
            }
        })
    }

    #[test]
    fn test_mismatched_keys_ignore() {
        for (extra_expected, extra_actual) in mismatched_cases() {
            let reconciler = ValueReconciler::with_config(config(
                MismatchedKeysBehaviour::Ignore,
                NoAvailablePluginBehaviour::Throw,
            ))
            .with_plugin(matching_plugin());

            let result = reconciler
                .reconcile(with_matching(extra_expected), with_matching(extra_actual))
                .unwrap();
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_mismatched_keys_report_as_difference() {
        for (extra_expected, extra_actual) in mismatched_cases() {
            let reconciler = ValueReconciler::with_config(config(
                MismatchedKeysBehaviour::ReportAsDifference,
                NoAvailablePluginBehaviour::Throw,
            ))
            .with_plugin(matching_plugin());

            let result = reconciler
                .reconcile(
                    with_matching(extra_expected.clone()),
                    with_matching(extra_actual.clone()),
                )
                .unwrap();

            assert_eq!(result.len(), extra_expected.len() + extra_actual.len());
            for (key, value) in extra_expected {
                assert_eq!(
                    result.get(&key),
                    Some(&FieldDifference::expected_only(key.clone(), value))
                );
            }
            for (key, value) in extra_actual {
                assert_eq!(
                    result.get(&key),
                    Some(&FieldDifference::actual_only(key.clone(), value))
                );
            }
        }
    }

    #[test]
    fn test_mismatched_keys_throw() {
        for (extra_expected, extra_actual) in mismatched_cases() {
            let reconciler = ValueReconciler::with_config(ReconcilerConfig::strict())
                .with_plugin(matching_plugin());

            let err = reconciler
                .reconcile(with_matching(extra_expected), with_matching(extra_actual))
                .unwrap_err();
            assert!(matches!(err, ReconcileError::MismatchedKey { .. }));
        }
    }

    #[test]
    fn test_mismatched_keys_treat_missing_value_as_null() {
        for (extra_expected, extra_actual) in mismatched_cases() {
            let plugin = RecordingPlugin::new(vec![
                ("val1", PluginResult::different(None)),
                ("val2", PluginResult::different(None)),
            ]);
            let reconciler = ValueReconciler::with_config(config(
                MismatchedKeysBehaviour::TreatMissingValueAsNull,
                NoAvailablePluginBehaviour::Throw,
            ))
            .with_plugin(matching_plugin())
            .with_plugin(plugin.clone());

            let result = reconciler
                .reconcile(
                    with_matching(extra_expected.clone()),
                    with_matching(extra_actual.clone()),
                )
                .unwrap();

            assert_eq!(result.len(), extra_expected.len() + extra_actual.len());
            for (key, value) in &extra_expected {
                assert_eq!(
                    result.get(key),
                    Some(&FieldDifference::expected_only(key.clone(), value.clone()))
                );
            }
            for (key, value) in &extra_actual {
                assert_eq!(
                    result.get(key),
                    Some(&FieldDifference::actual_only(key.clone(), value.clone()))
                );
            }

            // The plugin saw the missing side as null
            let calls = plugin.calls();
            for (key, value) in extra_expected {
                assert!(calls.contains(&(key, value, None)));
            }
            for (key, value) in extra_actual {
                assert!(calls.contains(&(key, None, value)));
            }
        }
    }

    #[test]
    fn test_throw_discards_collected_differences() {
        let reconciler = ValueReconciler::with_config(
            ReconcilerConfig::default().with_mismatched_keys(MismatchedKeysBehaviour::Throw),
        );

        // "a" is a reportable difference, "z" is unmatched and aborts
        let result = reconciler.reconcile(
            values(&[("a", 1), ("b", 2)]),
            values(&[("a", 5), ("b", 2), ("z", 9)]),
        );
        assert!(matches!(
            result,
            Err(ReconcileError::MismatchedKey { ref key, side: Side::Actual }) if key == "z"
        ));
    }
}
