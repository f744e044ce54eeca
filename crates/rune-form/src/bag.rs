use indexmap::IndexMap;

use crate::value::FieldValue;

/// Aggregate name -> value projection of a form's fields.
///
/// Derived state: the form rewrites entries as fields change and never treats
/// the bag as authoritative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueBag {
    entries: IndexMap<String, FieldValue>,
}

impl ValueBag {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the previous value for `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.entries.shift_remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// JSON object of every entry, in insertion order.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replace_remove() {
        let mut bag = ValueBag::default();
        assert!(bag.insert("a", 1).is_none());
        assert_eq!(bag.insert("a", 2), Some(FieldValue::Number(1.0)));
        bag.insert("b", "x");
        assert_eq!(bag.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(bag.remove("a"), Some(FieldValue::Number(2.0)));
        assert!(!bag.contains("a"));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn json_object_keeps_order() {
        let mut bag = ValueBag::default();
        bag.insert("z", true);
        bag.insert("a", "text");
        let json = serde_json::to_string(&bag.to_json()).unwrap();
        assert_eq!(json, r#"{"z":true,"a":"text"}"#);
    }
}
