//! Dependency evaluation.
//!
//! A field is enabled exactly when every `(field-name, required-value)` pair
//! in its dependency list matches the aggregate bag. Evaluation is a pure
//! function of the dependency list and the bag.
//!
//! The form re-evaluates every field that declares dependencies after each
//! change, so one settle costs O(fields x average dependency count) per pass.
//! That is fine for forms of tens of fields; there is no incremental
//! dependency graph, so forms with thousands of dependent fields will feel it.

use crate::bag::ValueBag;
use crate::value::FieldValue;

/// Precondition on another field's aggregate value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    /// Field *name* (the bag key), not id.
    pub field: String,
    pub value: FieldValue,
}

impl Dependency {
    pub fn new(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Absent entries never satisfy a dependency.
    pub fn is_met(&self, values: &ValueBag) -> bool {
        values.get(&self.field) == Some(&self.value)
    }
}

/// Enabled state implied by `dependencies`. An empty list is always enabled.
pub fn evaluate(dependencies: &[Dependency], values: &ValueBag) -> bool {
    dependencies.iter().all(|dep| dep.is_met(values))
}

/// Dependencies currently blocking a field, in declaration order.
pub fn unmet<'a>(
    dependencies: &'a [Dependency],
    values: &'a ValueBag,
) -> impl Iterator<Item = &'a Dependency> + 'a {
    dependencies.iter().filter(move |dep| !dep.is_met(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_always_enabled() {
        assert!(evaluate(&[], &ValueBag::default()));
    }

    #[test]
    fn unknown_name_is_unmet() {
        let deps = [Dependency::new("ghost", true)];
        assert!(!evaluate(&deps, &ValueBag::default()));
    }

    #[test]
    fn comparison_is_type_aware() {
        let mut values = ValueBag::default();
        values.insert("flag", FieldValue::Number(1.0));
        assert!(!evaluate(&[Dependency::new("flag", true)], &values));
        assert!(evaluate(&[Dependency::new("flag", 1)], &values));
    }

    #[test]
    fn all_pairs_must_hold() {
        let mut values = ValueBag::default();
        values.insert("a", true);
        values.insert("b", "x");
        let deps = [Dependency::new("a", true), Dependency::new("b", "y")];
        assert!(!evaluate(&deps, &values));
        let blocking: Vec<_> = unmet(&deps, &values).map(|d| d.field.as_str()).collect();
        assert_eq!(blocking, vec!["b"]);

        values.insert("b", "y");
        assert!(evaluate(&deps, &values));
    }
}
