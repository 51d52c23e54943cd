//! Floating point and decimal comparison plugins with tolerances

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::extract_side;
use crate::traits::ComparisonPlugin;
use crate::types::*;
use crate::utils::validation::{validate_decimal_tolerance, validate_float_tolerance};

/// Which tolerance checks are active. Either passing check makes values equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceModes {
    /// `|actual - expected| <= absolute`
    pub absolute: bool,
    /// `|actual - expected| / min(|actual|, |expected|) <= relative`,
    /// only checked when both values are non-zero
    pub relative: bool,
}

impl ToleranceModes {
    pub const NONE: Self = Self {
        absolute: false,
        relative: false,
    };
    pub const ABSOLUTE: Self = Self {
        absolute: true,
        relative: false,
    };
    pub const RELATIVE: Self = Self {
        absolute: false,
        relative: true,
    };
    pub const BOTH: Self = Self {
        absolute: true,
        relative: true,
    };
}

/// Tolerance settings for one numeric type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tolerance<T> {
    pub modes: ToleranceModes,
    pub absolute: T,
    pub relative: T,
}

impl<T: Default> Tolerance<T> {
    /// Exact comparison
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn absolute(tolerance: T) -> Self {
        Self {
            modes: ToleranceModes::ABSOLUTE,
            absolute: tolerance,
            relative: T::default(),
        }
    }

    pub fn relative(tolerance: T) -> Self {
        Self {
            modes: ToleranceModes::RELATIVE,
            absolute: T::default(),
            relative: tolerance,
        }
    }
}

impl<T> Tolerance<T> {
    pub fn both(absolute: T, relative: T) -> Self {
        Self {
            modes: ToleranceModes::BOTH,
            absolute,
            relative,
        }
    }
}

/// Numeric types usable with [`TolerancePlugin`]
pub trait ToleranceNumber: Clone + Default + PartialOrd + Sized {
    fn zero() -> Self;
    fn from_value(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
    fn minus(&self, other: &Self) -> Self;
    fn divided_by(&self, other: &Self) -> Self;
    fn magnitude(&self) -> Self;
    /// Reject tolerances that cannot serve as a bound
    fn validate_tolerance(name: &str, tolerance: &Self) -> ReconcileResult<()>;
}

impl ToleranceNumber for f64 {
    fn zero() -> Self {
        0.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn minus(&self, other: &Self) -> Self {
        self - other
    }

    fn divided_by(&self, other: &Self) -> Self {
        self / other
    }

    fn magnitude(&self) -> Self {
        self.abs()
    }

    fn validate_tolerance(name: &str, tolerance: &Self) -> ReconcileResult<()> {
        validate_float_tolerance(name, *tolerance)
    }
}

impl ToleranceNumber for f32 {
    fn zero() -> Self {
        0.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::F32(self)
    }

    fn minus(&self, other: &Self) -> Self {
        self - other
    }

    fn divided_by(&self, other: &Self) -> Self {
        self / other
    }

    fn magnitude(&self) -> Self {
        self.abs()
    }

    fn validate_tolerance(name: &str, tolerance: &Self) -> ReconcileResult<()> {
        validate_float_tolerance(name, f64::from(*tolerance))
    }
}

impl ToleranceNumber for BigDecimal {
    fn zero() -> Self {
        BigDecimal::from(0)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Decimal(self)
    }

    fn minus(&self, other: &Self) -> Self {
        self - other
    }

    fn divided_by(&self, other: &Self) -> Self {
        self / other
    }

    fn magnitude(&self) -> Self {
        self.abs()
    }

    fn validate_tolerance(name: &str, tolerance: &Self) -> ReconcileResult<()> {
        validate_decimal_tolerance(name, tolerance)
    }
}

/// Compares floating point or decimal values, optionally within a tolerance.
///
/// When one side is missing the result is `Different` with the signed value
/// of the present side (`actual - expected`, missing taken as zero), unless
/// `treat_missing_as_zero` is set, in which case the missing side takes part
/// in the normal tolerance comparison as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TolerancePlugin<T> {
    pub treat_missing_as_zero: bool,
    tolerance: Tolerance<T>,
}

pub type F64Plugin = TolerancePlugin<f64>;
pub type F32Plugin = TolerancePlugin<f32>;
pub type DecimalPlugin = TolerancePlugin<BigDecimal>;

impl<T: ToleranceNumber> TolerancePlugin<T> {
    /// Exact comparison, missing values reported as differences
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tolerance after validating it
    pub fn with_tolerance(mut self, tolerance: Tolerance<T>) -> ReconcileResult<Self> {
        T::validate_tolerance("absolute", &tolerance.absolute)?;
        T::validate_tolerance("relative", &tolerance.relative)?;
        self.tolerance = tolerance;
        Ok(self)
    }

    pub fn treating_missing_as_zero(mut self) -> Self {
        self.treat_missing_as_zero = true;
        self
    }

    pub fn tolerance(&self) -> &Tolerance<T> {
        &self.tolerance
    }

    fn within_tolerance(&self, expected: &T, actual: &T, difference: &T) -> bool {
        let zero = T::zero();
        let modes = self.tolerance.modes;

        if modes.absolute && difference.magnitude() <= self.tolerance.absolute {
            return true;
        }

        if modes.relative && *expected != zero && *actual != zero {
            let expected_magnitude = expected.magnitude();
            let actual_magnitude = actual.magnitude();
            let smaller = if actual_magnitude < expected_magnitude {
                actual_magnitude
            } else {
                expected_magnitude
            };
            if difference.magnitude().divided_by(&smaller) <= self.tolerance.relative {
                return true;
            }
        }

        false
    }
}

impl<T: ToleranceNumber + Send + Sync> ComparisonPlugin for TolerancePlugin<T> {
    fn try_compare(&self, _key: &str, expected: Option<&Value>, actual: Option<&Value>) -> PluginResult {
        let (Some(expected), Some(actual)) = (
            extract_side(expected, T::from_value),
            extract_side(actual, T::from_value),
        ) else {
            return PluginResult::unable_to_compare();
        };

        let (expected, actual) = match (expected, actual) {
            (Some(expected), Some(actual)) => (expected, actual),
            (None, None) => return PluginResult::unable_to_compare(),
            (expected, actual) => {
                let expected = expected.unwrap_or_else(T::zero);
                let actual = actual.unwrap_or_else(T::zero);
                if !self.treat_missing_as_zero {
                    return PluginResult::different(Some(actual.minus(&expected).into_value()));
                }
                (expected, actual)
            }
        };

        let difference = actual.minus(&expected);
        if difference == T::zero() || self.within_tolerance(&expected, &actual, &difference) {
            PluginResult::equal()
        } else {
            PluginResult::different(Some(difference.into_value()))
        }
    }
}
