//! Composite keys identifying one logical entity within a collection

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Value;

/// Named key parts identifying one object.
///
/// Two keys are equal when they have the same part names and identical
/// values per part, nulls included. The order in which parts were added is
/// irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompositeKey(BTreeMap<String, Option<Value>>);

impl CompositeKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key with a single part
    pub fn single(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().with_part(name, value)
    }

    pub fn with_part(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, Some(value.into()));
        self
    }

    pub fn with_null_part(mut self, name: impl Into<String>) -> Self {
        self.insert(name, None);
        self
    }

    /// Set a part, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: Option<Value>) -> Option<Option<Value>> {
        self.0.insert(name.into(), value)
    }

    /// Value of a part; `Some(None)` for a null part, `None` for no such part
    pub fn get(&self, name: &str) -> Option<Option<&Value>> {
        self.0.get(name).map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_ref()))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Value>)> for CompositeKey {
    fn from_iter<I: IntoIterator<Item = (K, Option<Value>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, value)| (name.into(), value)).collect())
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match value {
                Some(value) => write!(f, "{name}: {value}")?,
                None => write!(f, "{name}: null")?,
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_part_order_is_irrelevant() {
        let a = CompositeKey::new().with_part("book", "A").with_part("id", 1i32);
        let b = CompositeKey::new().with_part("id", 1i32).with_part("book", "A");
        assert_eq!(a, b);

        let set: HashSet<CompositeKey> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_null_parts_are_equal() {
        let a = CompositeKey::single("id", 1i32).with_null_part("book");
        let b = CompositeKey::single("id", 1i32).with_null_part("book");
        let c = CompositeKey::single("id", 1i32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.get("book"), Some(None));
        assert_eq!(c.get("book"), None);
    }

    #[test]
    fn test_values_must_be_identical() {
        assert_ne!(CompositeKey::single("id", 1i32), CompositeKey::single("id", 1i64));
        assert_ne!(CompositeKey::single("id", "a"), CompositeKey::single("id", "A"));
    }

    #[test]
    fn test_from_iter_and_display() {
        let key: CompositeKey = vec![("id", Some(Value::I32(7))), ("book", None)]
            .into_iter()
            .collect();
        assert_eq!(key.len(), 2);
        assert_eq!(key.to_string(), "{book: null, id: 7}");
    }
}
