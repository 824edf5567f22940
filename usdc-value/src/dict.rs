//! Insertion-ordered string-keyed dictionaries, used both for the
//! `customData`/`assetInfo`-style metadata fields and for nested
//! dictionary values.

use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary(IndexMap<String, Value>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Dictionary(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut d = Dictionary::new();
        d.insert("b", Value::Scalar(crate::value::Scalar::Bool(true)));
        d.insert("a", Value::Scalar(crate::value::Scalar::Bool(false)));
        let keys: Vec<_> = d.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
    }
}
