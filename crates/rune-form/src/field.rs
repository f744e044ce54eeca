use serde::{Deserialize, Serialize};

use crate::dependency::Dependency;
use crate::kind::FieldKind;
use crate::options::OptionSet;
use crate::range::NumericRange;
use crate::value::FieldValue;

pub type FieldId = String;

/// Font selection carried as display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// Presentation-only metadata. Never consulted by propagation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDisplay {
    pub title: Option<String>,
    pub alternate_title: Option<String>,
    pub info: Option<String>,
    pub placeholder: Option<String>,
    pub image: Option<String>,
    pub font: Option<FontSpec>,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyboardType {
    Default,
    Ascii,
    Numeric,
    Decimal,
    Phone,
    Email,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutocapitalizationType {
    None,
    Words,
    Sentences,
    AllCharacters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutocorrectionType {
    Default,
    No,
    Yes,
}

/// Hints for text-entry widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInputTraits {
    pub is_secure: Option<bool>,
    pub keyboard: Option<KeyboardType>,
    pub autocapitalization: Option<AutocapitalizationType>,
    pub autocorrection: Option<AutocorrectionType>,
}

/// A single form control: declarative spec plus live state.
///
/// Live state (`value`, `checked`, `enabled`) is only mutated through
/// [`crate::Form`], which routes every write through propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    id: FieldId,
    name: String,
    kind: FieldKind,
    value: FieldValue,
    default_value: FieldValue,
    checked: bool,
    initial_checked: bool,
    enabled: bool,
    hide_when_disabled: bool,
    dependencies: Vec<Dependency>,
    options: OptionSet,
    option_map_name: Option<String>,
    range: NumericRange,
    display: FieldDisplay,
    text_input: TextInputTraits,
}

impl Field {
    pub fn new(id: impl Into<FieldId>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            value: FieldValue::None,
            default_value: FieldValue::None,
            checked: false,
            initial_checked: false,
            enabled: true,
            hide_when_disabled: false,
            dependencies: Vec::new(),
            options: OptionSet::default(),
            option_map_name: None,
            range: NumericRange::default(),
            display: FieldDisplay::default(),
            text_input: TextInputTraits::default(),
        }
    }

    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Also seeds `value` when it is still unset.
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = value.into();
        if self.value.is_none() {
            self.value = self.default_value.clone();
        }
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn hide_when_disabled(mut self, hide: bool) -> Self {
        self.hide_when_disabled = hide;
        self
    }

    pub fn with_dependency(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.dependencies.push(Dependency::new(field, value));
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, option: Field) -> Self {
        self.options.insert(key, option);
        self
    }

    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    pub fn with_option_map(mut self, name: impl Into<String>) -> Self {
        self.option_map_name = Some(name.into());
        self
    }

    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.display.title = Some(title.into());
        self
    }

    pub fn with_display(mut self, display: FieldDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn with_text_input(mut self, text_input: TextInputTraits) -> Self {
        self.text_input = text_input;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn default_value(&self) -> &FieldValue {
        &self.default_value
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn hides_when_disabled(&self) -> bool {
        self.hide_when_disabled
    }

    /// Rendered unless disabled with `hide_when_disabled` set.
    pub fn is_visible(&self) -> bool {
        self.enabled || !self.hide_when_disabled
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn option_map_name(&self) -> Option<&str> {
        self.option_map_name.as_deref()
    }

    pub fn range(&self) -> &NumericRange {
        &self.range
    }

    pub fn display(&self) -> &FieldDisplay {
        &self.display
    }

    pub fn text_input(&self) -> &TextInputTraits {
        &self.text_input
    }

    /// Value this field writes into the aggregate bag. Stepper text has
    /// already been read as a number by coercion, so this is the live value.
    pub fn export_value(&self) -> FieldValue {
        self.value.clone()
    }

    /// Whether this field currently owns an aggregate entry: enabled, holding
    /// a value, and (for radios) checked.
    pub fn contributes(&self) -> bool {
        self.enabled
            && !self.value.is_none()
            && (self.kind != FieldKind::Radio || self.checked)
    }

    /// Coerces the construction-time state into a legal shape for the kind.
    pub(crate) fn normalized(mut self) -> Self {
        if !self.value.is_none() || self.kind == FieldKind::Separator {
            let raw = std::mem::take(&mut self.value);
            self.value = self.kind.coerce(raw, &FieldValue::None, &self.range);
        }
        if self.kind == FieldKind::Checkbox {
            match self.value.as_bool() {
                Some(b) => self.checked = b,
                None => self.value = FieldValue::Bool(self.checked),
            }
        }
        self.initial_checked = self.checked;
        self
    }

    pub(crate) fn assign_value(&mut self, raw: FieldValue) {
        self.value = self.kind.coerce(raw, &self.value, &self.range);
        if self.kind == FieldKind::Checkbox {
            self.checked = self.value.as_bool().unwrap_or(false);
        }
    }

    pub(crate) fn assign_checked(&mut self, checked: bool) {
        self.checked = checked;
        if self.kind == FieldKind::Checkbox {
            self.value = FieldValue::Bool(checked);
        }
    }

    /// Returns whether the flag actually flipped.
    pub(crate) fn assign_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    pub(crate) fn replace_options(&mut self, options: OptionSet) {
        self.options = options;
    }

    /// Restores value and checked state from the defaults.
    pub(crate) fn restore_defaults(&mut self) {
        self.value = FieldValue::None;
        let default = self.default_value.clone();
        if !default.is_none() {
            self.assign_value(default);
        }
        self.checked = self.initial_checked;
        if self.kind == FieldKind::Checkbox {
            match self.value.as_bool() {
                Some(b) => self.checked = b,
                None => self.value = FieldValue::Bool(self.checked),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seeds_unset_value() {
        let field = Field::new("n", "n", FieldKind::Text).with_default("hello");
        assert_eq!(field.value(), &FieldValue::from("hello"));

        let field = Field::new("n", "n", FieldKind::Text)
            .with_value("set")
            .with_default("hello");
        assert_eq!(field.value(), &FieldValue::from("set"));
    }

    #[test]
    fn checkbox_keeps_value_and_checked_in_sync() {
        let mut field = Field::new("c", "c", FieldKind::Checkbox).normalized();
        assert_eq!(field.value(), &FieldValue::Bool(false));

        field.assign_checked(true);
        assert_eq!(field.value(), &FieldValue::Bool(true));

        field.assign_value(FieldValue::Bool(false));
        assert!(!field.is_checked());
    }

    #[test]
    fn normalization_clamps_initial_numbers() {
        let field = Field::new("age", "age", FieldKind::Stepper)
            .with_range(NumericRange::new(0.0, 120.0))
            .with_value(400)
            .normalized();
        assert_eq!(field.value(), &FieldValue::Number(120.0));
    }

    #[test]
    fn stepper_text_is_stored_as_number() {
        let mut field = Field::new("w", "weight", FieldKind::Stepper)
            .with_range(NumericRange {
                units: Some("kg".into()),
                ..NumericRange::default()
            })
            .with_value(" 12 kg")
            .normalized();
        assert_eq!(field.value(), &FieldValue::Number(12.0));
        assert_eq!(field.export_value(), FieldValue::Number(12.0));

        field.assign_value(FieldValue::from("7kg"));
        assert_eq!(field.export_value(), FieldValue::Number(7.0));
    }

    #[test]
    fn radio_contributes_only_when_checked() {
        let radio = Field::new("s", "size", FieldKind::Radio).with_value("S");
        assert!(!radio.contributes());
        assert!(radio.clone().with_checked(true).contributes());
        assert!(!radio.with_checked(true).with_enabled(false).contributes());
    }

    #[test]
    fn visibility_follows_hide_flag() {
        let field = Field::new("x", "x", FieldKind::Text).with_enabled(false);
        assert!(field.is_visible());
        assert!(!field.hide_when_disabled(true).is_visible());
    }

    #[test]
    fn restore_defaults_resets_live_state() {
        let mut field = Field::new("c", "c", FieldKind::Checkbox)
            .with_default(true)
            .normalized();
        field.assign_checked(false);
        field.restore_defaults();
        assert!(field.is_checked());
        assert_eq!(field.value(), &FieldValue::Bool(true));
    }
}
