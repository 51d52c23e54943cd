//! Flattening of serializable objects through `serde_json`

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::traits::{FlatValues, Flattener};
use crate::types::*;
use crate::utils::validation::validate_root_key;

/// Flattens any `Serialize` type into dotted keys.
///
/// Object fields become `parent.child`, array elements become `items[0]`.
/// JSON numbers map to `I64`, then `U64`, then `F64`; `null` maps to a
/// missing value. Empty objects and arrays produce no entries. A top-level
/// scalar is keyed by the root key, or by the empty string without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonFlattener;

impl JsonFlattener {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Serialize + ?Sized> Flattener<T> for JsonFlattener {
    fn flatten(&self, root_key: Option<&str>, object: &T) -> ReconcileResult<FlatValues> {
        if let Some(root_key) = root_key {
            validate_root_key(root_key)?;
        }

        let json = serde_json::to_value(object).map_err(|e| ReconcileError::Flatten(e.to_string()))?;

        let mut values = Vec::new();
        flatten_json(root_key, &json, &mut values);
        trace!(entries = values.len(), "flattened object");

        Ok(values)
    }
}

fn flatten_json(prefix: Option<&str>, json: &JsonValue, values: &mut FlatValues) {
    match json {
        JsonValue::Object(fields) => {
            for (name, child) in fields {
                let key = match prefix {
                    Some(prefix) => format!("{prefix}.{name}"),
                    None => name.clone(),
                };
                flatten_json(Some(&key), child, values);
            }
        }
        JsonValue::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let key = format!("{}[{index}]", prefix.unwrap_or_default());
                flatten_json(Some(&key), child, values);
            }
        }
        scalar => values.push((prefix.unwrap_or_default().to_string(), scalar_value(scalar))),
    }
}

fn scalar_value(json: &JsonValue) -> Option<Value> {
    match json {
        JsonValue::Bool(b) => Some(Value::Bool(*b)),
        JsonValue::String(s) => Some(Value::String(s.clone())),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::I64)
            .or_else(|| n.as_u64().map(Value::U64))
            .or_else(|| n.as_f64().map(Value::F64)),
        _ => None,
    }
}
