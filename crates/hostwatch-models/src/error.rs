//! Error types for the `hostwatch-models` crate.
//!
//! Converting an identity response into a [`Credential`](crate::Credential)
//! is the only fallible operation here; it reports [`ModelError`].

/// Errors produced when validating wire payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required field was absent or empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// Dotted path of the missing field, e.g. `access.token.id`.
        field: String,
    },
}

impl ModelError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }
}
