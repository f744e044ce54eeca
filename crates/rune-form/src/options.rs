use indexmap::IndexMap;

use crate::field::Field;
use crate::value::FieldValue;

/// Ordered key -> display field mapping for picker and radio choices.
///
/// Embedded fields carry presentation only; their `value` is used as the
/// selection value when set, and their enabled state is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    entries: IndexMap<String, Field>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, option: Field) -> Option<Field> {
        self.entries.insert(key.into(), option)
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value written to the owning field when `key` is selected: the option's
    /// own value if it has one, else the key as text.
    pub fn selection_value(&self, key: &str) -> Option<FieldValue> {
        self.entries.get(key).map(|option| match option.value() {
            FieldValue::None => FieldValue::Text(key.to_string()),
            value => value.clone(),
        })
    }

    /// Label shown for `key`, falling back to the key itself.
    pub fn title(&self, key: &str) -> Option<&str> {
        self.entries
            .get_key_value(key)
            .map(|(k, option)| option.display().title.as_deref().unwrap_or(k.as_str()))
    }
}

impl FromIterator<(String, Field)> for OptionSet {
    fn from_iter<T: IntoIterator<Item = (String, Field)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
