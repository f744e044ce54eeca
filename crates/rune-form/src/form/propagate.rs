use tracing::{debug, trace, warn};

use super::Form;
use crate::dependency;
use crate::error::{FormError, Result};
use crate::event::{FieldChange, FormEvent};
use crate::field::Field;
use crate::kind::FieldKind;
use crate::options::OptionSet;
use crate::section::Section;
use crate::value::FieldValue;

/// Outcome of one form operation after it has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub epoch: u64,
    /// Evaluation passes run; 0 when the operation did not touch the bag.
    pub passes: usize,
    /// Visible row count changed, so an in-place refresh is not enough.
    pub structure_changed: bool,
}

impl Form {
    /// Writes a field's value. The input is coerced for the field's kind and
    /// a value-changed event fires even when the value is unchanged.
    pub fn set_value(&mut self, id: &str, value: impl Into<FieldValue>) -> Result<Settled> {
        let index = self.index_of(id)?;
        self.fields[index].assign_value(value.into());
        self.pending.push(FormEvent::field(id, FieldChange::Value));
        self.publish(index);
        Ok(self.finish(true))
    }

    /// Raw text from an entry widget, committed through [`Form::set_value`].
    pub fn commit_input(&mut self, id: &str, text: &str) -> Result<Settled> {
        self.set_value(id, FieldValue::Text(text.to_string()))
    }

    /// Checks or unchecks a field. Checking a radio clears every same-name
    /// radio sibling.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> Result<Settled> {
        let index = self.index_of(id)?;
        self.fields[index].assign_checked(checked);
        self.pending.push(FormEvent::field(id, FieldChange::Checked(checked)));

        match self.fields[index].kind() {
            FieldKind::Radio => {
                if checked {
                    self.clear_radio_siblings(index);
                }
                self.publish(index);
                Ok(self.finish(true))
            }
            FieldKind::Checkbox => {
                self.publish(index);
                Ok(self.finish(true))
            }
            _ => Ok(self.finish(false)),
        }
    }

    /// Overrides a field's enabled state.
    ///
    /// The bag entry follows the flag. When the bag changes and
    /// `cascade_enabled_changes` is set, dependents are re-evaluated in the
    /// same settle; otherwise they catch up on the next value edit. Fields
    /// that declare dependencies are re-derived by that evaluation, so an
    /// override only sticks while it agrees with them.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<Settled> {
        let index = self.index_of(id)?;
        let bag_changed = self.apply_enabled(index, enabled);
        let cascade = bag_changed && self.config.cascade_enabled_changes;
        Ok(self.finish(cascade))
    }

    /// Selects `key` from the field's option set: writes the option's value
    /// (or the key) and, on a radio, checks it.
    pub fn select_option(&mut self, id: &str, key: &str) -> Result<Settled> {
        let index = self.index_of(id)?;
        self.resolve_options(index);
        let Some(value) = self.fields[index].options().selection_value(key) else {
            self.flush();
            return Err(FormError::UnknownOption {
                id: id.to_string(),
                key: key.to_string(),
            });
        };

        self.fields[index].assign_value(value);
        self.pending.push(FormEvent::field(id, FieldChange::Value));
        if self.fields[index].kind() == FieldKind::Radio && !self.fields[index].is_checked() {
            self.fields[index].assign_checked(true);
            self.pending.push(FormEvent::field(id, FieldChange::Checked(true)));
            self.clear_radio_siblings(index);
        }
        self.publish(index);
        Ok(self.finish(true))
    }

    /// Replaces a field's option set wholesale. Options are display data, so
    /// the bag is untouched.
    pub fn load_options(&mut self, id: &str, options: OptionSet) -> Result<Settled> {
        let index = self.index_of(id)?;
        self.fields[index].replace_options(options);
        self.pending.push(FormEvent::OptionsLoaded { id: id.to_string() });
        Ok(self.finish(false))
    }

    /// A field's options, asking the delegate for its `optionMapName` the
    /// first time they are needed.
    pub fn options(&mut self, id: &str) -> Result<&OptionSet> {
        let index = self.index_of(id)?;
        self.resolve_options(index);
        self.flush();
        Ok(self.fields[index].options())
    }

    /// Attaches a field, evaluates its dependencies once and settles.
    pub fn add_field(&mut self, field: Field) -> Result<Settled> {
        let index = self.insert_field(field)?;
        let field = &self.fields[index];
        if field.has_dependencies() {
            let enabled = dependency::evaluate(field.dependencies(), &self.values);
            self.fields[index].assign_enabled(enabled);
        }
        if self.fields[index].kind() == FieldKind::Radio && self.fields[index].is_checked() {
            self.clear_radio_siblings(index);
        }
        self.publish(index);
        Ok(self.finish(true))
    }

    pub fn add_section(&mut self, section: Section) -> Settled {
        self.sections.push(section);
        self.warn_dangling_references();
        self.finish(true)
    }

    /// Restores every field's value from its default and re-projects the bag.
    pub fn reset(&mut self) -> Settled {
        for index in 0..self.fields.len() {
            let was_checked = self.fields[index].is_checked();
            self.fields[index].restore_defaults();
            let field = &self.fields[index];
            let id = field.id().to_string();
            let checked = field.is_checked();
            self.pending.push(FormEvent::field(&id, FieldChange::Value));
            if checked != was_checked {
                self.pending.push(FormEvent::field(&id, FieldChange::Checked(checked)));
            }
        }
        self.enforce_radio_exclusivity();
        self.rebuild_values();
        self.finish(true)
    }

    /// Flips the enabled flag and moves the bag entry with it. Returns whether
    /// the bag changed.
    pub(super) fn apply_enabled(&mut self, index: usize, enabled: bool) -> bool {
        if !self.fields[index].assign_enabled(enabled) {
            return false;
        }
        let id = self.fields[index].id().to_string();
        self.pending.push(FormEvent::field(&id, FieldChange::Enabled(enabled)));
        self.publish(index)
    }

    /// Writes the field's export into the bag, or retracts it when the field
    /// no longer contributes. Returns whether the bag changed.
    fn publish(&mut self, index: usize) -> bool {
        let field = &self.fields[index];
        if !field.contributes() {
            return self.withdraw(index);
        }
        let export = field.export_value();
        let previous = self.values.insert(field.name(), export.clone());
        previous.as_ref() != Some(&export)
    }

    /// Drops a non-contributing field's entry unless a same-name field still
    /// owns the current value; falls back to the last remaining contributor.
    fn withdraw(&mut self, index: usize) -> bool {
        let name = self.fields[index].name().to_string();
        let Some(current) = self.values.get(&name).cloned() else {
            return false;
        };
        let mut contributors: Vec<FieldValue> = self
            .fields
            .values()
            .filter(|field| field.name() == name && field.contributes())
            .map(Field::export_value)
            .collect();
        if contributors.contains(&current) {
            return false;
        }
        match contributors.pop() {
            Some(value) => {
                self.values.insert(name, value);
            }
            None => {
                self.values.remove(&name);
            }
        }
        true
    }

    fn clear_radio_siblings(&mut self, index: usize) {
        let name = self.fields[index].name().to_string();
        let siblings: Vec<usize> = self
            .fields
            .values()
            .enumerate()
            .filter(|(i, field)| {
                *i != index
                    && field.kind() == FieldKind::Radio
                    && field.name() == name
                    && field.is_checked()
            })
            .map(|(i, _)| i)
            .collect();
        for sibling in siblings {
            self.uncheck(sibling);
        }
    }

    pub(super) fn uncheck(&mut self, index: usize) {
        self.fields[index].assign_checked(false);
        let id = self.fields[index].id().to_string();
        self.pending.push(FormEvent::field(&id, FieldChange::Checked(false)));
    }

    /// Asks the delegate for options when the field names a map and has none.
    fn resolve_options(&mut self, index: usize) -> bool {
        let field = &self.fields[index];
        if !field.options().is_empty() {
            return false;
        }
        let (Some(map_name), Some(delegate)) = (field.option_map_name(), self.delegate.as_ref()) else {
            return false;
        };
        let Some(options) = delegate.option_map(map_name) else {
            debug!(field = field.id(), map = map_name, "delegate has no option map");
            return false;
        };
        let id = field.id().to_string();
        self.fields[index].replace_options(options);
        self.pending.push(FormEvent::OptionsLoaded { id });
        true
    }

    /// Ends an operation: settles when the bag may have changed, recounts rows
    /// and delivers queued events.
    pub(super) fn finish(&mut self, broadcast: bool) -> Settled {
        let passes = if broadcast { self.settle() } else { 0 };
        let structure_changed = self.refresh_row_count();
        self.flush();
        Settled {
            epoch: self.epoch,
            passes,
            structure_changed,
        }
    }

    /// Broadcasts form-changed and re-evaluates every dependent field until
    /// a pass leaves the bag untouched.
    fn settle(&mut self) -> usize {
        if self.propagating {
            trace!(epoch = self.epoch, "settle requested while propagating");
            return 0;
        }
        self.propagating = true;
        self.epoch += 1;
        self.pending.push(FormEvent::FormChanged { epoch: self.epoch });

        let cascade = self.config.cascade_enabled_changes;
        let limit = self.config.pass_limit();
        let mut passes = 0;
        loop {
            passes += 1;
            let changed = self.evaluation_pass();
            if !changed || !cascade {
                break;
            }
            if passes >= limit {
                warn!(epoch = self.epoch, passes, "dependency evaluation did not converge");
                break;
            }
        }

        self.propagating = false;
        debug!(
            epoch = self.epoch,
            passes,
            entries = self.values.len(),
            "form settled"
        );
        passes
    }

    /// One sweep over every field that declares dependencies. Later fields
    /// see bag changes made by earlier ones. Returns whether the bag changed.
    fn evaluation_pass(&mut self) -> bool {
        let mut bag_changed = false;
        for index in 0..self.fields.len() {
            let field = &self.fields[index];
            if !field.has_dependencies() {
                continue;
            }
            let enabled = dependency::evaluate(field.dependencies(), &self.values);
            if enabled == field.is_enabled() {
                continue;
            }
            trace!(
                field = field.id(),
                enabled,
                unmet = dependency::unmet(field.dependencies(), &self.values).count(),
                "dependency state changed"
            );
            bag_changed |= self.apply_enabled(index, enabled);
        }
        bag_changed
    }

    fn refresh_row_count(&mut self) -> bool {
        let current = self.count_visible_rows();
        let previous = std::mem::replace(&mut self.visible_rows, current);
        if previous == current {
            return false;
        }
        self.pending.push(FormEvent::RowsChanged { previous, current });
        true
    }

    fn flush(&mut self) {
        let events = std::mem::take(&mut self.pending);
        if !events.is_empty() {
            self.subscribers.dispatch(&events);
        }
    }
}
