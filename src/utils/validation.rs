//! Validation utilities

use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that a floating point tolerance is a usable bound
pub fn validate_float_tolerance(name: &str, tolerance: f64) -> ReconcileResult<()> {
    if tolerance.is_nan() {
        return Err(ReconcileError::Configuration(format!(
            "{name} tolerance cannot be NaN"
        )));
    }

    if tolerance < 0.0 {
        return Err(ReconcileError::Configuration(format!(
            "{name} tolerance cannot be negative: {tolerance}"
        )));
    }

    Ok(())
}

/// Validate that a decimal tolerance is non-negative
pub fn validate_decimal_tolerance(name: &str, tolerance: &BigDecimal) -> ReconcileResult<()> {
    if *tolerance < BigDecimal::from(0) {
        Err(ReconcileError::Configuration(format!(
            "{name} tolerance cannot be negative: {tolerance}"
        )))
    } else {
        Ok(())
    }
}

/// Validate a root key handed to a flattener
pub fn validate_root_key(root_key: &str) -> ReconcileResult<()> {
    if root_key.trim().is_empty() {
        return Err(ReconcileError::Flatten(
            "Root key cannot be empty".to_string(),
        ));
    }

    Ok(())
}
