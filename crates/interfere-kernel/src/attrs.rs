//! Named attributes attached to bodies and faces.

use std::collections::BTreeMap;

/// Attribute payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Integer list.
    Int(Vec<i32>),
    /// Real list.
    Real(Vec<f64>),
    /// String.
    Str(String),
}

impl AttrValue {
    /// First integer of an `Int` attribute.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            AttrValue::Int(v) => v.first().copied(),
            _ => None,
        }
    }

    /// String payload of a `Str` attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Ordered attribute table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        self.0.insert(key.into(), value);
    }

    /// Look up an attribute.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Remove an attribute, returning its old value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_replace() {
        let mut attrs = Attributes::new();
        assert!(attrs.is_empty());
        attrs.set(".source", AttrValue::Int(vec![3]));
        attrs.set("_name", AttrValue::Str("wing".into()));
        assert_eq!(attrs.get(".source").and_then(AttrValue::as_int), Some(3));
        assert_eq!(attrs.get("_name").and_then(AttrValue::as_str), Some("wing"));
        assert_eq!(attrs.get("_name").and_then(AttrValue::as_int), None);

        attrs.set(".source", AttrValue::Int(vec![7]));
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get(".source").and_then(AttrValue::as_int), Some(7));
        assert_eq!(attrs.remove(".source"), Some(AttrValue::Int(vec![7])));
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["_name"]);
    }

    #[test]
    fn test_real_is_not_int() {
        assert_eq!(AttrValue::Real(vec![1.0]).as_int(), None);
        assert_eq!(AttrValue::Int(vec![]).as_int(), None);
    }
}
