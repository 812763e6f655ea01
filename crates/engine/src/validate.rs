//! Required-field checks run before any mutation.

use crate::error::{EngineError, FieldError};

/// Collects every missing field so the caller can re-prompt once.
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Require a non-blank string.
    pub(crate) fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::required(field));
        }
        self
    }

    /// Require an optional string to be present and non-blank.
    pub(crate) fn required_opt(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.required(field, value.unwrap_or(""))
    }

    pub(crate) fn finish(&mut self) -> Result<(), EngineError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}
