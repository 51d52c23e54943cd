//! String, boolean, GUID and enum plugins

use super::extract_side;
use crate::traits::ComparisonPlugin;
use crate::types::*;

/// Compares strings, optionally ignoring case.
///
/// By default a missing string and an empty string are considered equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPlugin {
    pub treat_null_and_empty_as_equal: bool,
    pub ignore_case: bool,
}

impl Default for StringPlugin {
    fn default() -> Self {
        Self {
            treat_null_and_empty_as_equal: true,
            ignore_case: false,
        }
    }
}

impl StringPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_null_and_empty_as_equal(mut self, treat_as_equal: bool) -> Self {
        self.treat_null_and_empty_as_equal = treat_as_equal;
        self
    }
}

impl ComparisonPlugin for StringPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        let (Some(expected), Some(actual)) = (
            extract_side(expected, Value::as_str),
            extract_side(actual, Value::as_str),
        ) else {
            return PluginResult::unable_to_compare();
        };

        let is_blank = |s: Option<&str>| s.map_or(true, str::is_empty);
        if self.treat_null_and_empty_as_equal && is_blank(expected) && is_blank(actual) {
            return PluginResult::equal();
        }

        let same = match (expected, actual) {
            (None, None) => true,
            (Some(expected), Some(actual)) if self.ignore_case => {
                expected.to_lowercase() == actual.to_lowercase()
            }
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        };

        PluginResult::from_outcome(if same {
            ComparisonOutcome::Equal
        } else {
            ComparisonOutcome::Different
        })
    }
}

/// Equal/Different for two present values of one type, no payload
fn compare_present<T: PartialEq>(
    expected: Option<&Value>,
    actual: Option<&Value>,
    extract: impl Fn(&Value) -> Option<T>,
) -> PluginResult {
    match (expected.and_then(&extract), actual.and_then(&extract)) {
        (Some(expected), Some(actual)) if expected == actual => PluginResult::equal(),
        (Some(_), Some(_)) => PluginResult::different(None),
        _ => PluginResult::unable_to_compare(),
    }
}

/// Compares booleans; both values must be present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolPlugin;

impl ComparisonPlugin for BoolPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        compare_present(expected, actual, |value| match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        })
    }
}

/// Compares GUIDs; both values must be present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuidPlugin;

impl ComparisonPlugin for GuidPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        compare_present(expected, actual, |value| match value {
            Value::Guid(v) => Some(*v),
            _ => None,
        })
    }
}

/// Compares two variants of the same enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumPlugin;

impl ComparisonPlugin for EnumPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        match (expected, actual) {
            (Some(Value::Enum(expected)), Some(Value::Enum(actual)))
                if expected.type_name == actual.type_name =>
            {
                if expected.variant == actual.variant {
                    PluginResult::equal()
                } else {
                    PluginResult::different(None)
                }
            }
            _ => PluginResult::unable_to_compare(),
        }
    }
}
