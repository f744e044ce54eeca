//! Data-driven form model.
//!
//! A [`Form`] owns a set of typed [`Field`]s grouped into [`Section`]s. Each
//! enabled field projects its value into an aggregate [`ValueBag`] keyed by
//! field name, and fields that declare [`Dependency`] records are enabled or
//! disabled from that bag. Every write goes through the form so the bag,
//! dependent fields and visible row counts stay consistent.
//!
//! Forms can be described as camelCase JSON property bags; see [`codec`].
//!
//! ```
//! use rune_form::{Field, FieldKind, Form, FormConfig, Section};
//!
//! let mut form = Form::from_parts(
//!     FormConfig::default(),
//!     [
//!         Field::new("hasPet", "hasPet", FieldKind::Checkbox),
//!         Field::new("petName", "petName", FieldKind::Text)
//!             .with_dependency("hasPet", true)
//!             .hide_when_disabled(true),
//!     ],
//!     vec![Section::new(["hasPet", "petName"])],
//! )?;
//! assert_eq!(form.visible_row_count(), 1);
//!
//! form.set_checked("hasPet", true)?;
//! assert_eq!(form.visible_row_count(), 2);
//! # Ok::<(), rune_form::FormError>(())
//! ```

pub mod bag;
pub mod codec;
pub mod delegate;
pub mod dependency;
pub mod error;
pub mod event;
pub mod field;
pub mod form;
pub mod kind;
pub mod options;
pub mod range;
pub mod section;
pub mod value;

pub use bag::ValueBag;
pub use codec::{DependencySpec, EncodedValue, FieldSpec, FormSpec, SectionSpec};
pub use delegate::FormDelegate;
pub use dependency::Dependency;
pub use error::{FormError, Result};
pub use event::{FieldChange, FieldObserver, FormEvent, FormObserver, SubscriptionId};
pub use field::{
    AutocapitalizationType, AutocorrectionType, Field, FieldDisplay, FieldId, FontSpec,
    KeyboardType, TextInputTraits,
};
pub use form::{Form, Settled};
pub use kind::FieldKind;
pub use options::OptionSet;
pub use range::NumericRange;
pub use rune_config::FormConfig;
pub use section::{Row, Section};
pub use value::FieldValue;
