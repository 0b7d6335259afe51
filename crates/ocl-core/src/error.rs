//! Core error types for ocl-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! parse failures on the closed vocabularies of the dictionary model.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Core errors produced by the ocl-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A URL owner segment was neither `users` nor `orgs`.
    #[error("unknown owner kind: '{0}'")]
    UnknownOwnerKind(String),

    /// A stored or submitted owner type was not recognised.
    #[error("unknown owner type: '{0}'")]
    UnknownOwnerType(String),

    /// A `public_access` value was not one of View, Edit or None.
    #[error("unknown access level: '{0}'")]
    UnknownAccessLevel(String),

    /// Submitted data failed field-level validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::Validation(errors)
    }
}
