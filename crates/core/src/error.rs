//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing references, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more input fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FormErrors),

    /// A referenced entity does not exist.
    #[error("{entity} \"{id}\" was not found.")]
    NotFound { entity: &'static str, id: String },

    /// An identifier was malformed (blank, too long, ...).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The requested change collides with existing state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(FormErrors::single(msg))
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<FormErrors> for DomainError {
    fn from(value: FormErrors) -> Self {
        Self::Validation(value)
    }
}

/// Ordered, human-readable validation messages collected while checking a form.
///
/// Messages are deduplicated so that a field reported twice shows up once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<String>);

impl FormErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(msg: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(msg);
        errors
    }

    pub fn push(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        if !self.0.contains(&msg) {
            self.0.push(msg);
        }
    }

    pub fn extend(&mut self, other: FormErrors) {
        for msg in other.0 {
            self.push(msg);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    /// `Ok(value)` when nothing was reported, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl core::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_errors_keep_order_and_skip_duplicates() {
        let mut errors = FormErrors::new();
        errors.push("Field \"name\" is required.");
        errors.push("Field \"description\" is required.");
        errors.push("Field \"name\" is required.");

        assert_eq!(
            errors.messages(),
            [
                "Field \"name\" is required.".to_string(),
                "Field \"description\" is required.".to_string(),
            ]
        );
    }

    #[test]
    fn into_result_is_ok_only_without_messages() {
        assert_eq!(FormErrors::new().into_result(7), Ok(7));
        assert!(FormErrors::single("bad").into_result(7).is_err());
    }

    #[test]
    fn not_found_renders_entity_and_id() {
        let err = DomainError::not_found("Band", "Metallica");
        assert_eq!(err.to_string(), "Band \"Metallica\" was not found.");
    }
}
