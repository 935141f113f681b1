//! Validation of product drafts
//!
//! Fields carry ordered validator chains. Per-field validation gives immediate
//! feedback while typing; [`ValidationEngine::validate_all`] is the submission gate.

pub mod engine;
pub mod validators;

pub use engine::{ErrorList, FieldValidator, ValidationEngine, ValidationErrorSet};
