//! Assessment intake — submission types, sanitization and validation.

pub mod validation;

pub use validation::{sanitize, validate, AssessmentSubmission, ValidatedSubmission};
