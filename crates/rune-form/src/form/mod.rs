//! The form: owner of fields and sections, and the propagation hub.
//!
//! Widgets never mutate a [`Field`] directly. Every write goes through a
//! `Form` method, which updates the aggregate bag, re-evaluates dependent
//! fields until the bag stops changing, recounts visible rows and finally
//! notifies observers.

mod propagate;

use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;
use rune_config::FormConfig;
use tracing::warn;

use crate::bag::ValueBag;
use crate::delegate::FormDelegate;
use crate::error::{FormError, Result};
use crate::event::{FieldObserver, FormEvent, FormObserver, SubscriptionId, Subscribers};
use crate::field::{Field, FieldId};
use crate::kind::FieldKind;
use crate::section::{Row, Section};
use crate::value::FieldValue;

pub use propagate::Settled;

pub struct Form {
    name: Option<String>,
    title: Option<String>,
    fields: IndexMap<FieldId, Field>,
    sections: Vec<Section>,
    values: ValueBag,
    config: FormConfig,
    epoch: u64,
    propagating: bool,
    visible_rows: usize,
    pending: Vec<FormEvent>,
    subscribers: Subscribers,
    delegate: Option<Box<dyn FormDelegate>>,
}

impl Default for Form {
    fn default() -> Self {
        Self::with_config(FormConfig::default())
    }
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormConfig) -> Self {
        Self {
            name: None,
            title: None,
            fields: IndexMap::new(),
            sections: Vec::new(),
            values: ValueBag::default(),
            config,
            epoch: 0,
            propagating: false,
            visible_rows: 0,
            pending: Vec::new(),
            subscribers: Subscribers::default(),
            delegate: None,
        }
    }

    /// Attaches all fields and sections at once, projects the bag a single
    /// time and settles the whole form.
    pub fn from_parts(
        config: FormConfig,
        fields: impl IntoIterator<Item = Field>,
        sections: Vec<Section>,
    ) -> Result<Self> {
        let mut form = Self::with_config(config);
        for field in fields {
            form.insert_field(field)?;
        }
        form.sections = sections;
        form.enforce_radio_exclusivity();
        form.rebuild_values();
        form.warn_dangling_references();
        form.finish(true);
        Ok(form)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_delegate(mut self, delegate: impl FormDelegate + 'static) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    pub fn set_delegate(&mut self, delegate: Option<Box<dyn FormDelegate>>) {
        self.delegate = delegate;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Number of settles that followed a value or structural change.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn contains_field(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Every field sharing `name`, e.g. the radios of one group.
    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.values().filter(move |field| field.name() == name)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// The aggregate name -> value bag.
    pub fn values(&self) -> &ValueBag {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Aggregate bag as a JSON object, ready for submission.
    pub fn submission(&self) -> serde_json::Value {
        self.values.to_json()
    }

    /// Delegated to the host; `true` when no delegate is installed.
    pub fn can_submit(&self) -> bool {
        self.delegate
            .as_ref()
            .is_none_or(|delegate| delegate.can_submit(&self.values))
    }

    /// Rows rendered for section `index` after visibility filtering. Hidden
    /// sections and out-of-range indices yield no rows.
    pub fn fields_in_section(&self, index: usize) -> Vec<Row<'_>> {
        let Some(section) = self.sections.get(index) else {
            return Vec::new();
        };
        if section.is_hidden() {
            return Vec::new();
        }
        section
            .field_ids()
            .iter()
            .filter_map(|id| {
                if self.config.is_separator(id) {
                    return Some(Row::Separator);
                }
                let field = self.fields.get(id)?;
                field.is_visible().then_some(Row::Field(field))
            })
            .collect()
    }

    /// Total rows across all sections as of the last settle.
    pub fn visible_row_count(&self) -> usize {
        self.visible_rows
    }

    pub fn subscribe<O: FormObserver + 'static>(&mut self, observer: Rc<RefCell<O>>) -> SubscriptionId {
        self.subscribers.subscribe_form(observer)
    }

    pub fn subscribe_field<O: FieldObserver + 'static>(
        &mut self,
        id: &str,
        observer: Rc<RefCell<O>>,
    ) -> Result<SubscriptionId> {
        if !self.fields.contains_key(id) {
            return Err(FormError::UnknownField(id.to_string()));
        }
        Ok(self.subscribers.subscribe_field(id, observer))
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(subscription)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.fields
            .get_index_of(id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))
    }

    /// Validates and stores a field without propagating.
    fn insert_field(&mut self, field: Field) -> Result<usize> {
        let range = field.range();
        if !range.is_valid() {
            return Err(FormError::InvalidRange {
                id: field.id().to_string(),
                min: range.min.unwrap_or_default(),
                max: range.max.unwrap_or_default(),
            });
        }
        if self.fields.contains_key(field.id()) {
            return Err(FormError::DuplicateField(field.id().to_string()));
        }
        let field = field.normalized();
        let (index, _) = self.fields.insert_full(field.id().to_string(), field);
        Ok(index)
    }

    fn count_visible_rows(&self) -> usize {
        (0..self.sections.len())
            .map(|index| self.fields_in_section(index).len())
            .sum()
    }

    /// Re-projects the whole bag from the field map.
    fn rebuild_values(&mut self) {
        self.values.clear();
        for field in self.fields.values() {
            if field.contributes() {
                self.values.insert(field.name(), field.export_value());
            }
        }
    }

    /// Leaves only the last checked radio of each name checked.
    fn enforce_radio_exclusivity(&mut self) {
        let mut last_checked: IndexMap<String, usize> = IndexMap::new();
        let mut cleared = Vec::new();
        for (index, field) in self.fields.values().enumerate() {
            if field.kind() != FieldKind::Radio || !field.is_checked() {
                continue;
            }
            if let Some(previous) = last_checked.insert(field.name().to_string(), index) {
                cleared.push(previous);
            }
        }
        for index in cleared {
            if self.fields[index].is_checked() {
                self.uncheck(index);
            }
        }
    }

    fn warn_dangling_references(&self) {
        for (position, section) in self.sections.iter().enumerate() {
            for id in section.field_ids() {
                if !self.config.is_separator(id) && !self.fields.contains_key(id) {
                    warn!(section = position, field = %id, "section references unknown field");
                }
            }
        }
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("sections", &self.sections.len())
            .field("values", &self.values)
            .field("epoch", &self.epoch)
            .field("visible_rows", &self.visible_rows)
            .field("subscribers", &self.subscribers)
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}
