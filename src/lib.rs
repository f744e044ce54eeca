//! Rune Forms: a data-driven form engine.
//!
//! Re-exports the form model and its configuration so hosts can depend on a
//! single crate.

pub use rune_config as config;
pub use rune_form::*;
