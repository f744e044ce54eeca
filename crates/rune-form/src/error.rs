//! Error types for form construction and decoding.

use thiserror::Error;

/// Result type for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

/// Errors raised while building, decoding or addressing a form.
///
/// User-input paths never produce these: coercion is total.
#[derive(Error, Debug)]
pub enum FormError {
    /// A required key was absent from a serialized field spec.
    #[error("missing field `{key}` in {context}")]
    MissingKey { key: &'static str, context: String },

    /// A field spec stored under one key declares a different id.
    #[error("field spec stored under `{key}` declares id `{id}`")]
    IdMismatch { key: String, id: String },

    #[error("duplicate field id: {0}")]
    DuplicateField(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Numeric range with `min > max`.
    #[error("field `{id}` has min {min} greater than max {max}")]
    InvalidRange { id: String, min: f64, max: f64 },

    /// A serialized value could not be decoded.
    #[error("invalid value for field `{id}`: {reason}")]
    InvalidValue { id: String, reason: String },

    #[error("field `{id}` has no option `{key}`")]
    UnknownOption { id: String, key: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
