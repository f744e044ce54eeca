use crate::value::FieldValue;

/// Numeric-range metadata for slider and stepper fields.
///
/// Unset bounds do not clamp. A missing `min` reads as `0` when a fallback
/// value is needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step_size: Option<f64>,
    pub precision: Option<u32>,
    pub units: Option<String>,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    /// `min <= max` whenever both bounds are set.
    pub fn is_valid(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    pub fn clamp(&self, n: f64) -> f64 {
        let mut n = n;
        if let Some(min) = self.min {
            n = n.max(min);
        }
        if let Some(max) = self.max {
            n = n.min(max);
        }
        n
    }

    /// Rounds to `precision` decimal places. Values too large to scale are
    /// returned unchanged.
    pub fn round(&self, n: f64) -> f64 {
        match self.precision {
            Some(places) => {
                let factor = 10f64.powi(places.min(15) as i32);
                let scaled = n * factor;
                if !scaled.is_finite() {
                    return n;
                }
                scaled.round() / factor
            }
            None => n,
        }
    }

    /// Parses free text: all whitespace is dropped, then the units suffix.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let digits = match self.units.as_deref().map(str::trim) {
            Some(units) if !units.is_empty() => {
                let units: String = units.chars().filter(|c| !c.is_whitespace()).collect();
                compact.strip_suffix(units.as_str()).unwrap_or(&compact).to_string()
            }
            _ => compact,
        };
        digits.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Value used when input cannot be read as a number: the previous numeric
    /// value, then `min`.
    pub fn fallback(&self, previous: &FieldValue) -> f64 {
        previous
            .as_number()
            .unwrap_or_else(|| self.min.unwrap_or(0.0))
    }

    /// Total coercion of arbitrary input into an in-range, finite number.
    pub fn coerce(&self, raw: &FieldValue, previous: &FieldValue) -> f64 {
        let parsed = match raw {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(text) => self.parse(text),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        let n = parsed.unwrap_or_else(|| self.fallback(previous));
        let n = self.round(self.clamp(n));
        if n.is_finite() {
            return n;
        }
        let fallback = self.round(self.clamp(self.fallback(previous)));
        if fallback.is_finite() { fallback } else { 0.0 }
    }
}
