//! Form and field notifications.
//!
//! Observers are registered on a [`crate::Form`] explicitly, either for every
//! form event or for the events of one field id. Events are queued while an
//! operation propagates and delivered once it has settled, in the order they
//! were produced.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use tracing::warn;

/// What changed on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    /// `value` was written. Fired on every write, redundant ones included.
    Value,
    Checked(bool),
    Enabled(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Field { id: String, change: FieldChange },
    /// A field's option set was replaced.
    OptionsLoaded { id: String },
    /// The aggregate bag changed; dependents have been re-evaluated.
    FormChanged { epoch: u64 },
    /// Total visible rows changed, so the layout needs a structural redraw.
    RowsChanged { previous: usize, current: usize },
}

impl FormEvent {
    pub(crate) fn field(id: &str, change: FieldChange) -> Self {
        FormEvent::Field {
            id: id.to_string(),
            change,
        }
    }

    /// Id of the field this event is scoped to, if any.
    pub fn field_id(&self) -> Option<&str> {
        match self {
            FormEvent::Field { id, .. } | FormEvent::OptionsLoaded { id } => Some(id),
            _ => None,
        }
    }
}

pub trait FormObserver {
    fn on_form_event(&mut self, event: &FormEvent);
}

pub trait FieldObserver {
    fn on_field_event(&mut self, id: &str, change: FieldChange);
}

/// Handle returned by subscription, accepted by `Form::unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type FormHandle = Rc<RefCell<dyn FormObserver>>;
type FieldHandle = Rc<RefCell<dyn FieldObserver>>;

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    form: Vec<(SubscriptionId, FormHandle)>,
    fields: HashMap<String, Vec<(SubscriptionId, FieldHandle)>>,
}

impl Subscribers {
    fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub(crate) fn subscribe_form(&mut self, observer: FormHandle) -> SubscriptionId {
        let id = self.allocate();
        self.form.push((id, observer));
        id
    }

    pub(crate) fn subscribe_field(&mut self, field_id: &str, observer: FieldHandle) -> SubscriptionId {
        let id = self.allocate();
        self.fields
            .entry(field_id.to_string())
            .or_default()
            .push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.len();
        self.form.retain(|(sub, _)| *sub != id);
        for list in self.fields.values_mut() {
            list.retain(|(sub, _)| *sub != id);
        }
        self.fields.retain(|_, list| !list.is_empty());
        self.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.form.len() + self.fields.values().map(Vec::len).sum::<usize>()
    }

    pub(crate) fn dispatch(&self, events: &[FormEvent]) {
        for event in events {
            for (sub, observer) in &self.form {
                match observer.try_borrow_mut() {
                    Ok(mut observer) => observer.on_form_event(event),
                    Err(_) => warn!(?sub, ?event, "form observer busy; event skipped"),
                }
            }

            let FormEvent::Field { id, change } = event else {
                continue;
            };
            let Some(list) = self.fields.get(id) else {
                continue;
            };
            for (sub, observer) in list {
                match observer.try_borrow_mut() {
                    Ok(mut observer) => observer.on_field_event(id, *change),
                    Err(_) => warn!(?sub, field = %id, "field observer busy; event skipped"),
                }
            }
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("form", &self.form.len())
            .field("fields", &self.fields.len())
            .finish()
    }
}
