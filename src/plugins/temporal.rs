//! Date-time and duration plugins

use chrono::{Duration, NaiveDateTime};

use super::extract_side;
use crate::traits::ComparisonPlugin;
use crate::types::*;

/// Compares naive date-times, optionally by calendar date only.
///
/// The payload of a difference is `actual - expected` as a duration. A
/// value missing on one side is always a difference, with no payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTimePlugin {
    pub ignore_time: bool,
}

impl DateTimePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignoring_time() -> Self {
        Self { ignore_time: true }
    }
}

impl ComparisonPlugin for DateTimePlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        let as_datetime = |value: &Value| match value {
            Value::DateTime(v) => Some(*v),
            _ => None,
        };
        let (Some(expected), Some(actual)) =
            (extract_side(expected, as_datetime), extract_side(actual, as_datetime))
        else {
            return PluginResult::unable_to_compare();
        };

        let (expected, actual): (NaiveDateTime, NaiveDateTime) = match (expected, actual) {
            (Some(expected), Some(actual)) => (expected, actual),
            (None, None) => return PluginResult::unable_to_compare(),
            _ => return PluginResult::different(None),
        };

        let delta = if self.ignore_time {
            actual.date().signed_duration_since(expected.date())
        } else {
            actual.signed_duration_since(expected)
        };

        if delta.is_zero() {
            PluginResult::equal()
        } else {
            PluginResult::different(Some(Value::Duration(delta)))
        }
    }
}

/// Compares signed durations, reporting `actual - expected`.
///
/// A missing side counts as a zero duration for the payload but is always a
/// difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationPlugin;

impl ComparisonPlugin for DurationPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        let as_duration = |value: &Value| match value {
            Value::Duration(v) => Some(*v),
            _ => None,
        };
        let (Some(expected), Some(actual)) =
            (extract_side(expected, as_duration), extract_side(actual, as_duration))
        else {
            return PluginResult::unable_to_compare();
        };

        let (expected, actual): (Duration, Duration) = match (expected, actual) {
            (Some(expected), Some(actual)) => (expected, actual),
            (None, None) => return PluginResult::unable_to_compare(),
            (Some(expected), None) => {
                return PluginResult::different(Some(Value::Duration(-expected)))
            }
            (None, Some(actual)) => return PluginResult::different(Some(Value::Duration(actual))),
        };

        if expected == actual {
            return PluginResult::equal();
        }

        // Out of range deltas are still differences, just without a payload
        PluginResult::different(actual.checked_sub(&expected).map(Value::Duration))
    }
}
