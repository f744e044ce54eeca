//! Property-bag representation of forms.
//!
//! External JSON uses camelCase keys. Values are single-key objects naming
//! their representation:
//! - `{"boolean": true}`
//! - `{"binary": "<base64>"}`
//! - `{"number": 3}`
//! - `{"string": "text"}`
//! - `{"url": "https://..."}`
//!
//! An absent value key means "no value". Decoding seeds an absent `value`
//! from `defaultValue`, so a field whose value was cleared while it has a
//! default comes back holding the default.
//!
//! Numbers must be finite; coercion never stores NaN or infinity, so every
//! encoded form decodes again.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use rune_config::FormConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::dependency::Dependency;
use crate::error::{FormError, Result};
use crate::field::{
    AutocapitalizationType, AutocorrectionType, Field, FieldDisplay, FontSpec, KeyboardType,
    TextInputTraits,
};
use crate::form::Form;
use crate::kind::FieldKind;
use crate::options::OptionSet;
use crate::range::NumericRange;
use crate::section::Section;
use crate::value::FieldValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSpec {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldSpec>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodedValue {
    Boolean(bool),
    Binary(String),
    Number(f64),
    String(String),
    Url(Url),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub field: String,
    pub value: EncodedValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub header: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

/// Serialized field. `id`, `name` and `type` are required; they are optional
/// here so a missing key can be reported with its context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<EncodedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<EncodedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_map_name: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard_type: Option<KeyboardType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocapitalization_type: Option<AutocapitalizationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocorrection_type: Option<AutocorrectionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_when_disabled: Option<bool>,
}

impl EncodedValue {
    pub fn encode(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(EncodedValue::Boolean(*b)),
            FieldValue::Number(n) => Some(EncodedValue::Number(*n)),
            FieldValue::Text(t) => Some(EncodedValue::String(t.clone())),
            FieldValue::Data(d) => Some(EncodedValue::Binary(BASE64.encode(d))),
            FieldValue::Url(u) => Some(EncodedValue::Url(u.clone())),
            FieldValue::None => None,
        }
    }

    /// `owner` names the field in error messages.
    pub fn decode(self, owner: &str) -> Result<FieldValue> {
        Ok(match self {
            EncodedValue::Boolean(b) => FieldValue::Bool(b),
            EncodedValue::Number(n) => FieldValue::Number(n),
            EncodedValue::String(s) => FieldValue::Text(s),
            EncodedValue::Url(u) => FieldValue::Url(u),
            EncodedValue::Binary(encoded) => {
                let bytes = BASE64
                    .decode(encoded.as_bytes())
                    .map_err(|err| FormError::InvalidValue {
                        id: owner.to_string(),
                        reason: format!("binary value is not base64: {err}"),
                    })?;
                FieldValue::Data(bytes)
            }
        })
    }
}

fn decode_optional(value: Option<EncodedValue>, owner: &str) -> Result<FieldValue> {
    value.map_or(Ok(FieldValue::None), |v| v.decode(owner))
}

impl FieldSpec {
    /// Builds a field. `key` is the map key the spec was stored under, used
    /// for error context and checked against the declared id.
    pub fn into_field(self, key: &str) -> Result<Field> {
        let context = format!("field spec `{key}`");
        let id = self.id.ok_or_else(|| FormError::MissingKey {
            key: "id",
            context: context.clone(),
        })?;
        let name = self.name.ok_or_else(|| FormError::MissingKey {
            key: "name",
            context: context.clone(),
        })?;
        let kind = self.kind.ok_or(FormError::MissingKey {
            key: "type",
            context,
        })?;

        let range = NumericRange {
            min: self.min,
            max: self.max,
            step_size: self.step_size,
            precision: self.precision,
            units: self.units,
        };
        if !range.is_valid() {
            return Err(FormError::InvalidRange {
                id,
                min: range.min.unwrap_or_default(),
                max: range.max.unwrap_or_default(),
            });
        }

        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for dep in self.dependencies {
            dependencies.push(Dependency {
                field: dep.field,
                value: dep.value.decode(&id)?,
            });
        }

        let mut options = OptionSet::new();
        for (option_key, option) in self.options {
            let option = option.into_field(&format!("{id}.options.{option_key}"))?;
            options.insert(option_key, option);
        }

        let display = FieldDisplay {
            title: self.title,
            alternate_title: self.alternate_title,
            info: self.info,
            placeholder: self.placeholder,
            image: self.image,
            font: self.font,
            color: self.color,
            background_color: self.background_color,
        };
        let text_input = TextInputTraits {
            is_secure: self.is_secure,
            keyboard: self.keyboard_type,
            autocapitalization: self.autocapitalization_type,
            autocorrection: self.autocorrection_type,
        };

        let value = decode_optional(self.value, &id)?;
        let default_value = decode_optional(self.default_value, &id)?;

        let mut field = Field::new(id, name, kind)
            .with_value(value)
            .with_default(default_value)
            .with_checked(self.checked.unwrap_or(false))
            .hide_when_disabled(self.hide_when_disabled.unwrap_or(false))
            .with_dependencies(dependencies)
            .with_options(options)
            .with_range(range)
            .with_display(display)
            .with_text_input(text_input);
        if let Some(map_name) = self.option_map_name {
            field = field.with_option_map(map_name);
        }
        Ok(field)
    }
}

impl From<&Field> for FieldSpec {
    fn from(field: &Field) -> Self {
        let display = field.display().clone();
        let text_input = field.text_input();
        let range = field.range().clone();
        Self {
            id: Some(field.id().to_string()),
            name: Some(field.name().to_string()),
            kind: Some(field.kind()),
            value: EncodedValue::encode(field.value()),
            default_value: EncodedValue::encode(field.default_value()),
            checked: field.is_checked().then_some(true),
            dependencies: field
                .dependencies()
                .iter()
                .filter_map(|dep| {
                    EncodedValue::encode(&dep.value).map(|value| DependencySpec {
                        field: dep.field.clone(),
                        value,
                    })
                })
                .collect(),
            image: display.image,
            title: display.title,
            alternate_title: display.alternate_title,
            info: display.info,
            placeholder: display.placeholder,
            font: display.font,
            color: display.color,
            background_color: display.background_color,
            option_map_name: field.option_map_name().map(str::to_string),
            options: field
                .options()
                .iter()
                .map(|(key, option)| (key.to_string(), FieldSpec::from(option)))
                .collect(),
            min: range.min,
            max: range.max,
            step_size: range.step_size,
            precision: range.precision,
            units: range.units,
            is_secure: text_input.is_secure,
            keyboard_type: text_input.keyboard,
            autocapitalization_type: text_input.autocapitalization,
            autocorrection_type: text_input.autocorrection,
            hide_when_disabled: field.hides_when_disabled().then_some(true),
        }
    }
}

impl From<SectionSpec> for Section {
    fn from(spec: SectionSpec) -> Self {
        Section::new(spec.fields)
            .with_header(spec.header)
            .with_footer(spec.footer)
            .with_hidden(spec.hidden)
    }
}

impl From<&Section> for SectionSpec {
    fn from(section: &Section) -> Self {
        Self {
            header: section.header().to_string(),
            footer: section.footer().to_string(),
            fields: section.field_ids().to_vec(),
            hidden: section.is_hidden(),
        }
    }
}

impl Form {
    /// Builds and settles a form from its property bag.
    pub fn from_spec(spec: FormSpec, config: FormConfig) -> Result<Self> {
        let mut fields = Vec::with_capacity(spec.fields.len());
        for (key, field_spec) in spec.fields {
            let field = field_spec.into_field(&key)?;
            if field.id() != key {
                return Err(FormError::IdMismatch {
                    key,
                    id: field.id().to_string(),
                });
            }
            fields.push(field);
        }
        let sections = spec.sections.into_iter().map(Section::from).collect();

        let mut form = Form::from_parts(config, fields, sections)?;
        if let Some(name) = spec.name {
            form = form.with_name(name);
        }
        if let Some(title) = spec.title {
            form = form.with_title(title);
        }
        Ok(form)
    }

    pub fn decode(value: &serde_json::Value) -> Result<Self> {
        Self::decode_with_config(value, FormConfig::default())
    }

    pub fn decode_with_config(value: &serde_json::Value, config: FormConfig) -> Result<Self> {
        let spec = FormSpec::deserialize(value)?;
        Self::from_spec(spec, config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: FormSpec = serde_json::from_str(json)?;
        Self::from_spec(spec, FormConfig::default())
    }

    pub fn from_path(path: impl AsRef<Path>, config: FormConfig) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let spec: FormSpec = serde_json::from_slice(&bytes)?;
        Self::from_spec(spec, config)
    }

    /// Property bag of the current live state.
    pub fn encode(&self) -> FormSpec {
        FormSpec {
            name: self.name().map(str::to_string),
            title: self.title().map(str::to_string),
            fields: self
                .fields()
                .map(|field| (field.id().to_string(), FieldSpec::from(field)))
                .collect(),
            sections: self.sections().iter().map(SectionSpec::from).collect(),
        }
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.encode())?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.encode())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encoded_value_shape() {
        let json = serde_json::to_value(EncodedValue::Boolean(true)).unwrap();
        assert_eq!(json, json!({ "boolean": true }));
        let back: EncodedValue = serde_json::from_value(json!({ "url": "https://rune.dev/" })).unwrap();
        assert!(matches!(back, EncodedValue::Url(_)));
    }

    #[test]
    fn binary_values_use_base64() {
        let encoded = EncodedValue::encode(&FieldValue::Data(vec![0, 1, 2])).unwrap();
        assert_eq!(encoded, EncodedValue::Binary("AAEC".to_string()));
        assert_eq!(encoded.decode("f").unwrap(), FieldValue::Data(vec![0, 1, 2]));

        let err = EncodedValue::Binary("***".into()).decode("f").unwrap_err();
        assert!(matches!(err, FormError::InvalidValue { .. }));
    }

    #[test]
    fn missing_required_keys_fail() {
        let spec: FieldSpec = serde_json::from_value(json!({ "id": "a", "type": "text" })).unwrap();
        let err = spec.into_field("a").unwrap_err();
        assert!(matches!(err, FormError::MissingKey { key: "name", .. }));
        assert_eq!(err.to_string(), "missing field `name` in field spec `a`");

        let spec: FieldSpec = serde_json::from_value(json!({ "id": "a", "name": "a" })).unwrap();
        assert!(matches!(
            spec.into_field("a").unwrap_err(),
            FormError::MissingKey { key: "type", .. }
        ));
    }

    #[test]
    fn optional_keys_default() {
        let spec: FieldSpec =
            serde_json::from_value(json!({ "id": "a", "name": "a", "type": "checkbox" })).unwrap();
        let field = spec.into_field("a").unwrap();
        assert!(!field.is_checked());
        assert!(field.is_enabled());
        assert!(!field.hides_when_disabled());
        assert!(field.dependencies().is_empty());
    }

    #[test]
    fn unknown_type_is_a_json_error() {
        let err = Form::decode(&json!({
            "fields": { "a": { "id": "a", "name": "a", "type": "date" } }
        }))
        .unwrap_err();
        assert!(matches!(err, FormError::Json(_)));
    }

    #[test]
    fn id_must_match_map_key() {
        let err = Form::decode(&json!({
            "fields": { "a": { "id": "b", "name": "a", "type": "text" } }
        }))
        .unwrap_err();
        assert!(matches!(err, FormError::IdMismatch { .. }));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = Form::decode(&json!({
            "fields": { "a": { "id": "a", "name": "a", "type": "slider", "min": 5, "max": 1 } }
        }))
        .unwrap_err();
        assert!(matches!(err, FormError::InvalidRange { .. }));
    }

    #[test]
    fn cleared_value_decodes_as_default() {
        let mut form = Form::from_parts(
            FormConfig::default(),
            vec![Field::new("nick", "nick", FieldKind::Text).with_default("Bob")],
            Vec::new(),
        )
        .unwrap();
        form.set_value("nick", FieldValue::None).unwrap();
        assert!(form.field("nick").unwrap().value().is_none());

        let spec = FieldSpec::from(form.field("nick").unwrap());
        assert!(spec.value.is_none());
        let decoded = spec.into_field("nick").unwrap();
        assert_eq!(decoded.value(), &FieldValue::from("Bob"));
    }

    #[test]
    fn camel_case_keys() {
        let field = Field::new("pw", "password", FieldKind::Text)
            .hide_when_disabled(true)
            .with_default("x")
            .with_text_input(TextInputTraits {
                is_secure: Some(true),
                keyboard: Some(KeyboardType::Ascii),
                ..TextInputTraits::default()
            });
        let json = serde_json::to_value(FieldSpec::from(&field)).unwrap();
        assert_eq!(json["hideWhenDisabled"], json!(true));
        assert_eq!(json["defaultValue"], json!({ "string": "x" }));
        assert_eq!(json["isSecure"], json!(true));
        assert_eq!(json["keyboardType"], json!("ascii"));
        assert_eq!(json["type"], json!("text"));
    }
}
