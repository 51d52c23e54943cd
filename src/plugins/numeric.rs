//! Integer comparison plugins
//!
//! Deltas are reported as `actual - expected`. Fixed-width integers are
//! widened to `i128` first, so the delta is exact for every supported width.

use bigdecimal::num_bigint::BigInt;

use super::extract_side;
use crate::traits::ComparisonPlugin;
use crate::types::*;

/// Shared comparison for integer families widened to `i128`
fn compare_widened(
    expected: Option<&Value>,
    actual: Option<&Value>,
    treat_missing_as_zero: bool,
    widen: impl Fn(&Value) -> Option<i128>,
) -> PluginResult {
    let (Some(expected), Some(actual)) = (extract_side(expected, &widen), extract_side(actual, &widen))
    else {
        return PluginResult::unable_to_compare();
    };

    let (expected, actual) = match (expected, actual) {
        (Some(expected), Some(actual)) => (expected, actual),
        (None, None) => return PluginResult::unable_to_compare(),
        (expected, actual) if treat_missing_as_zero => {
            (expected.unwrap_or(0), actual.unwrap_or(0))
        }
        _ => return PluginResult::unable_to_compare(),
    };

    if expected == actual {
        PluginResult::equal()
    } else {
        PluginResult::different(Some(Value::I128(actual - expected)))
    }
}

macro_rules! width_plugin {
    ($($(#[$doc:meta])* $name:ident => $variant:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Default, PartialEq, Eq)]
            pub struct $name {
                /// Compare a missing value as if it were present and zero
                pub treat_missing_as_zero: bool,
            }

            impl $name {
                pub fn new() -> Self {
                    Self::default()
                }

                pub fn treating_missing_as_zero(mut self) -> Self {
                    self.treat_missing_as_zero = true;
                    self
                }
            }

            impl ComparisonPlugin for $name {
                fn try_compare(
                    &self,
                    _key: &str,
                    expected: Option<&Value>,
                    actual: Option<&Value>,
                ) -> PluginResult {
                    compare_widened(expected, actual, self.treat_missing_as_zero, |value| {
                        match value {
                            Value::$variant(v) => Some(i128::from(*v)),
                            _ => None,
                        }
                    })
                }
            }
        )*
    };
}

width_plugin! {
    /// Compares `i8` values only
    I8Plugin => I8,
    /// Compares `i16` values only
    I16Plugin => I16,
    /// Compares `i32` values only
    I32Plugin => I32,
    /// Compares `i64` values only
    I64Plugin => I64,
    /// Compares `u8` values only
    U8Plugin => U8,
    /// Compares `u16` values only
    U16Plugin => U16,
    /// Compares `u32` values only
    U32Plugin => U32,
    /// Compares `u64` values only
    U64Plugin => U64,
}

fn widen_signed(value: &Value) -> Option<i128> {
    match value {
        Value::I8(v) => Some(i128::from(*v)),
        Value::I16(v) => Some(i128::from(*v)),
        Value::I32(v) => Some(i128::from(*v)),
        Value::I64(v) => Some(i128::from(*v)),
        _ => None,
    }
}

fn widen_unsigned(value: &Value) -> Option<i128> {
    match value {
        Value::U8(v) => Some(i128::from(*v)),
        Value::U16(v) => Some(i128::from(*v)),
        Value::U32(v) => Some(i128::from(*v)),
        Value::U64(v) => Some(i128::from(*v)),
        _ => None,
    }
}

/// Compares any mix of `i8`, `i16`, `i32` and `i64` values numerically
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedIntegerPlugin {
    pub treat_missing_as_zero: bool,
}

impl SignedIntegerPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn treating_missing_as_zero(mut self) -> Self {
        self.treat_missing_as_zero = true;
        self
    }
}

impl ComparisonPlugin for SignedIntegerPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        compare_widened(expected, actual, self.treat_missing_as_zero, widen_signed)
    }
}

/// Compares any mix of `u8`, `u16`, `u32` and `u64` values numerically
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsignedIntegerPlugin {
    pub treat_missing_as_zero: bool,
}

impl UnsignedIntegerPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn treating_missing_as_zero(mut self) -> Self {
        self.treat_missing_as_zero = true;
        self
    }
}

impl ComparisonPlugin for UnsignedIntegerPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        compare_widened(expected, actual, self.treat_missing_as_zero, widen_unsigned)
    }
}

fn widen_any(value: &Value) -> Option<i128> {
    match value {
        Value::I128(v) => Some(*v),
        other => widen_signed(other).or_else(|| widen_unsigned(other)),
    }
}

/// Compares any fixed-width integers numerically, signed and unsigned alike.
///
/// Also claims `i128`, the delta type every integer plugin reports. In the
/// standard chain it sits after the single-family plugins and decides mixed
/// pairs such as the `i64`/`u64` split of a large JSON number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegerPlugin {
    pub treat_missing_as_zero: bool,
}

impl IntegerPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn treating_missing_as_zero(mut self) -> Self {
        self.treat_missing_as_zero = true;
        self
    }
}

impl ComparisonPlugin for IntegerPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        compare_widened(expected, actual, self.treat_missing_as_zero, widen_any)
    }
}

/// Compares arbitrary precision integers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BigIntPlugin {
    pub treat_missing_as_zero: bool,
}

impl BigIntPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn treating_missing_as_zero(mut self) -> Self {
        self.treat_missing_as_zero = true;
        self
    }
}

impl ComparisonPlugin for BigIntPlugin {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        let as_bigint = |value: &Value| match value {
            Value::BigInt(v) => Some(v.clone()),
            _ => None,
        };
        let (Some(expected), Some(actual)) =
            (extract_side(expected, as_bigint), extract_side(actual, as_bigint))
        else {
            return PluginResult::unable_to_compare();
        };

        let (expected, actual) = match (expected, actual) {
            (Some(expected), Some(actual)) => (expected, actual),
            (None, None) => return PluginResult::unable_to_compare(),
            (expected, actual) if self.treat_missing_as_zero => (
                expected.unwrap_or_else(|| BigInt::from(0)),
                actual.unwrap_or_else(|| BigInt::from(0)),
            ),
            _ => return PluginResult::unable_to_compare(),
        };

        if expected == actual {
            PluginResult::equal()
        } else {
            PluginResult::different(Some(Value::BigInt(actual - expected)))
        }
    }
}
