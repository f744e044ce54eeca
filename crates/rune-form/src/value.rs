use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;
use url::Url;

/// Value held by a field or stored in the aggregate bag.
///
/// Equality is structural and type-aware: `Number(1.0)` never equals
/// `Bool(true)` and `Text("1")` never equals `Number(1.0)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Data(Vec<u8>),
    Url(Url),
    #[default]
    None,
}

impl FieldValue {
    pub fn is_none(&self) -> bool {
        matches!(self, FieldValue::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Finite numbers only; a stored NaN or infinity reads as absent.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            FieldValue::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Data(d) => Some(d),
            _ => None,
        }
    }

    /// Short tag used in logs and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::Data(_) => "binary",
            FieldValue::Url(_) => "url",
            FieldValue::None => "none",
        }
    }

    /// Plain JSON rendering used for submissions. Binary data becomes base64
    /// text and non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Text(t) => serde_json::Value::String(t.clone()),
            FieldValue::Data(d) => serde_json::Value::String(BASE64.encode(d)),
            FieldValue::Url(u) => serde_json::Value::String(u.to_string()),
            FieldValue::None => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(t) => f.write_str(t),
            FieldValue::Data(d) => write!(f, "<{} bytes>", d.len()),
            FieldValue::Url(u) => f.write_str(u.as_str()),
            FieldValue::None => Ok(()),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Data(value)
    }
}

impl From<Url> for FieldValue {
    fn from(value: Url) -> Self {
        FieldValue::Url(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Lenient boolean reading of free text (`true/yes/on/1`, `false/no/off/0`).
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
