use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::range::NumericRange;
use crate::value::{FieldValue, parse_flag};

/// Closed set of field types. Determines the rendering widget and which
/// value shapes are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Button,
    Color,
    Hidden,
    Picker,
    Radio,
    Separator,
    Slider,
    Stepper,
    Text,
    Title,
    Checkbox,
    Url,
}

impl FieldKind {
    pub const ALL: [FieldKind; 12] = [
        FieldKind::Button,
        FieldKind::Color,
        FieldKind::Hidden,
        FieldKind::Picker,
        FieldKind::Radio,
        FieldKind::Separator,
        FieldKind::Slider,
        FieldKind::Stepper,
        FieldKind::Text,
        FieldKind::Title,
        FieldKind::Checkbox,
        FieldKind::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Button => "button",
            FieldKind::Color => "color",
            FieldKind::Hidden => "hidden",
            FieldKind::Picker => "picker",
            FieldKind::Radio => "radio",
            FieldKind::Separator => "separator",
            FieldKind::Slider => "slider",
            FieldKind::Stepper => "stepper",
            FieldKind::Text => "text",
            FieldKind::Title => "title",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Url => "url",
        }
    }

    /// Picker and radio fields draw their choices from an option set.
    pub fn is_choice(self) -> bool {
        matches!(self, FieldKind::Picker | FieldKind::Radio)
    }

    /// Kinds whose `checked` flag carries meaning.
    pub fn uses_checked(self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Checkbox)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Slider | FieldKind::Stepper)
    }

    /// Coerces raw widget or programmatic input into a value legal for this
    /// kind. Total: input that cannot be read keeps `previous` (or the
    /// numeric fallback chain for sliders and steppers).
    pub fn coerce(self, raw: FieldValue, previous: &FieldValue, range: &NumericRange) -> FieldValue {
        match self {
            FieldKind::Slider | FieldKind::Stepper => {
                FieldValue::Number(range.coerce(&raw, previous))
            }
            FieldKind::Checkbox => match raw {
                FieldValue::Bool(b) => FieldValue::Bool(b),
                FieldValue::Number(n) if n.is_finite() => FieldValue::Bool(n != 0.0),
                FieldValue::Text(ref text) => match parse_flag(text) {
                    Some(b) => FieldValue::Bool(b),
                    None => FieldValue::Bool(previous.as_bool().unwrap_or(false)),
                },
                _ => FieldValue::Bool(previous.as_bool().unwrap_or(false)),
            },
            FieldKind::Text | FieldKind::Hidden | FieldKind::Title | FieldKind::Button => {
                match raw {
                    FieldValue::Number(n) => FieldValue::Text(n.to_string()),
                    FieldValue::Bool(b) => FieldValue::Text(b.to_string()),
                    FieldValue::Url(u) => FieldValue::Text(u.into()),
                    FieldValue::Data(bytes) => match String::from_utf8(bytes) {
                        Ok(text) => FieldValue::Text(text),
                        Err(err) => FieldValue::Data(err.into_bytes()),
                    },
                    other => other,
                }
            }
            FieldKind::Url => match raw {
                FieldValue::Url(u) => FieldValue::Url(u),
                FieldValue::Text(ref text) => match url::Url::parse(text.trim()) {
                    Ok(u) => FieldValue::Url(u),
                    Err(_) => previous.clone(),
                },
                FieldValue::None => FieldValue::None,
                _ => previous.clone(),
            },
            FieldKind::Color => match raw {
                FieldValue::Text(ref text) => match csscolorparser::parse(text.trim()) {
                    Ok(color) => FieldValue::Text(color.to_hex_string()),
                    Err(_) => previous.clone(),
                },
                FieldValue::Data(bytes) => FieldValue::Data(bytes),
                FieldValue::None => FieldValue::None,
                _ => previous.clone(),
            },
            FieldKind::Picker | FieldKind::Radio => match raw {
                FieldValue::Number(n) if !n.is_finite() => previous.clone(),
                other => other,
            },
            FieldKind::Separator => FieldValue::None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown field type `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerce(kind: FieldKind, raw: FieldValue, previous: FieldValue) -> FieldValue {
        kind.coerce(raw, &previous, &NumericRange::new(0.0, 10.0))
    }

    #[test]
    fn names_round_trip() {
        for kind in FieldKind::ALL {
            assert_eq!(kind.as_str().parse::<FieldKind>().unwrap(), kind);
        }
        assert!("date".parse::<FieldKind>().is_err());
    }

    #[test]
    fn stepper_text_is_parsed_and_clamped() {
        let out = coerce(FieldKind::Stepper, "42".into(), FieldValue::Number(3.0));
        assert_eq!(out, FieldValue::Number(10.0));
        let out = coerce(FieldKind::Stepper, "abc".into(), FieldValue::Number(3.0));
        assert_eq!(out, FieldValue::Number(3.0));
    }

    #[test]
    fn checkbox_normalises_to_bool() {
        assert_eq!(coerce(FieldKind::Checkbox, 1.into(), FieldValue::None), FieldValue::Bool(true));
        assert_eq!(coerce(FieldKind::Checkbox, "no".into(), FieldValue::None), FieldValue::Bool(false));
        assert_eq!(
            coerce(FieldKind::Checkbox, "??".into(), FieldValue::Bool(true)),
            FieldValue::Bool(true)
        );
    }

    #[test]
    fn text_renders_scalars() {
        assert_eq!(coerce(FieldKind::Text, 3.into(), FieldValue::None), FieldValue::from("3"));
        assert_eq!(coerce(FieldKind::Text, true.into(), FieldValue::None), FieldValue::from("true"));
        assert_eq!(
            coerce(FieldKind::Text, FieldValue::Data(b"ok".to_vec()), FieldValue::None),
            FieldValue::from("ok")
        );
    }

    #[test]
    fn url_keeps_previous_on_garbage() {
        let previous = FieldValue::Url(url::Url::parse("https://rune.dev/").unwrap());
        assert_eq!(coerce(FieldKind::Url, "not a url".into(), previous.clone()), previous);
        let parsed = coerce(FieldKind::Url, " https://example.com/a ".into(), FieldValue::None);
        assert_eq!(parsed.as_url().map(|u| u.as_str()), Some("https://example.com/a"));
    }

    #[test]
    fn color_normalises_to_hex() {
        assert_eq!(coerce(FieldKind::Color, "red".into(), FieldValue::None), FieldValue::from("#ff0000"));
        assert_eq!(
            coerce(FieldKind::Color, "nope".into(), FieldValue::from("#00ff00")),
            FieldValue::from("#00ff00")
        );
    }

    #[test]
    fn separator_never_holds_a_value() {
        assert!(coerce(FieldKind::Separator, "x".into(), FieldValue::None).is_none());
    }

    #[test]
    fn choice_accepts_anything() {
        assert_eq!(coerce(FieldKind::Picker, 7.into(), FieldValue::None), FieldValue::Number(7.0));
        assert!(FieldKind::Radio.is_choice());
        assert!(!FieldKind::Checkbox.is_choice());
    }

    #[test]
    fn choice_rejects_non_finite_numbers() {
        let previous = FieldValue::from("s");
        assert_eq!(coerce(FieldKind::Picker, f64::NAN.into(), previous.clone()), previous);
        assert_eq!(coerce(FieldKind::Radio, f64::INFINITY.into(), FieldValue::None), FieldValue::None);
    }
}
