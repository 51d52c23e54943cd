//! Core types and data structures for the reconciliation engine

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// A single dynamically typed value produced by flattening an object.
///
/// A null / missing value is represented as `None` in an `Option<Value>`,
/// never as a variant of this enum.
///
/// Equality on `Value` is *identity*: same variant, same data. Floating point
/// values compare by bit pattern, decimals compare numerically and opaque
/// values compare by allocation. This is the check the reconciler uses to skip
/// plugin dispatch, and the check composite keys use for bucketing. Tolerant
/// or type-aware comparison is the job of the plugins.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    BigInt(BigInt),
    F32(f32),
    F64(f64),
    Decimal(BigDecimal),
    String(String),
    DateTime(NaiveDateTime),
    Duration(Duration),
    Guid(Uuid),
    Enum(EnumValue),
    Opaque(OpaqueValue),
}

impl Value {
    /// Short name of the variant, used in log output and messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::I128(_) => "i128",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::BigInt(_) => "bigint",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Duration(_) => "duration",
            Value::Guid(_) => "guid",
            Value::Enum(_) => "enum",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Borrow the string contents, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::I128(a), Value::I128(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Guid(a), Value::Guid(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Bool(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::I128(v) => v.hash(state),
            Value::U8(v) => v.hash(state),
            Value::U16(v) => v.hash(state),
            Value::U32(v) => v.hash(state),
            Value::U64(v) => v.hash(state),
            Value::BigInt(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::DateTime(v) => v.hash(state),
            Value::Duration(v) => v.hash(state),
            Value::Guid(v) => v.hash(state),
            Value::Enum(v) => v.hash(state),
            Value::Opaque(v) => v.addr().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::I128(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Duration(v) => write!(f, "{v}"),
            Value::Guid(v) => write!(f, "{v}"),
            Value::Enum(v) => write!(f, "{v}"),
            Value::Opaque(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    BigInt => BigInt,
    f32 => F32,
    f64 => F64,
    BigDecimal => Decimal,
    String => String,
    NaiveDateTime => DateTime,
    Duration => Duration,
    Uuid => Guid,
    EnumValue => Enum,
    OpaqueValue => Opaque,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A named variant of a caller-defined enumeration.
///
/// Two enum values are only comparable when their `type_name` matches; an
/// enum is never compared against its underlying integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub type_name: String,
    pub variant: String,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            variant: variant.into(),
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.type_name, self.variant)
    }
}

/// Shared handle to an arbitrary caller object, compared by reference identity
#[derive(Clone)]
pub struct OpaqueValue(Arc<dyn Any + Send + Sync>);

impl OpaqueValue {
    /// Wrap a value in a fresh allocation
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wrap an existing shared allocation; clones of the same `Arc` stay identical
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    /// Whether both handles point at the same allocation
    pub fn ptr_eq(&self, other: &OpaqueValue) -> bool {
        self.addr() == other.addr()
    }

    /// Downcast to the concrete type, if it matches
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:#x})", self.addr())
    }
}

/// Outcome of a single plugin comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// The plugin does not handle this combination of values
    UnableToCompare,
    /// The plugin considers the values equal
    Equal,
    /// The plugin considers the values different
    Different,
}

/// Result returned by a comparison plugin
#[derive(Debug, Clone, PartialEq)]
pub struct PluginResult {
    pub outcome: ComparisonOutcome,
    /// Plugin-defined detail (e.g. numeric delta), only meaningful for `Different`
    pub payload: Option<Value>,
}

impl PluginResult {
    pub fn unable_to_compare() -> Self {
        Self {
            outcome: ComparisonOutcome::UnableToCompare,
            payload: None,
        }
    }

    pub fn equal() -> Self {
        Self {
            outcome: ComparisonOutcome::Equal,
            payload: None,
        }
    }

    pub fn different(payload: Option<Value>) -> Self {
        Self {
            outcome: ComparisonOutcome::Different,
            payload,
        }
    }

    /// Build a result from a bare outcome with no payload
    pub fn from_outcome(outcome: ComparisonOutcome) -> Self {
        Self {
            outcome,
            payload: None,
        }
    }
}

/// Which of the two inputs a key or value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Expected,
    Actual,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Expected => write!(f, "expected"),
            Side::Actual => write!(f, "actual"),
        }
    }
}

/// A single reported difference for one key
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDifference {
    pub key: String,
    pub expected_value: Option<Value>,
    pub actual_value: Option<Value>,
    pub payload: Option<Value>,
}

impl FieldDifference {
    pub fn new(
        key: String,
        expected_value: Option<Value>,
        actual_value: Option<Value>,
        payload: Option<Value>,
    ) -> Self {
        Self {
            key,
            expected_value,
            actual_value,
            payload,
        }
    }

    /// Difference for a key that only the expected side supplied
    pub fn expected_only(key: String, value: Option<Value>) -> Self {
        Self::new(key, value, None, None)
    }

    /// Difference for a key that only the actual side supplied
    pub fn actual_only(key: String, value: Option<Value>) -> Self {
        Self::new(key, None, value, None)
    }
}

/// Per-key differences produced by one reconciliation.
///
/// Only keys that differ are present; equal keys are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationResult {
    differences: HashMap<String, FieldDifference>,
}

impl ReconciliationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, difference: FieldDifference) {
        self.differences.insert(difference.key.clone(), difference);
    }

    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FieldDifference> {
        self.differences.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.differences.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.differences.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDifference> {
        self.differences.values()
    }

    /// Differences ordered by key, for stable reporting
    pub fn sorted(&self) -> Vec<&FieldDifference> {
        let mut differences: Vec<&FieldDifference> = self.differences.values().collect();
        differences.sort_by(|a, b| a.key.cmp(&b.key));
        differences
    }
}

impl IntoIterator for ReconciliationResult {
    type Item = FieldDifference;
    type IntoIter = std::collections::hash_map::IntoValues<String, FieldDifference>;

    fn into_iter(self) -> Self::IntoIter {
        self.differences.into_values()
    }
}

/// Errors that can occur during reconciliation
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Duplicate key '{key}' found in {side} values")]
    DuplicateKey { key: String, side: Side },
    #[error("Key '{key}' is only present in {side} values")]
    MismatchedKey { key: String, side: Side },
    #[error("Unable to compare values for '{0}'")]
    NoAvailablePlugin(String),
    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Flattening error: {0}")]
    Flatten(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
