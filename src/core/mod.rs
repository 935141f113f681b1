//! Core module containing the product model, validation and collaborator traits

pub mod error;
pub mod field;
pub mod product;
pub mod reference;
pub mod serde_helpers;
pub mod service;
pub mod validation;

pub use error::{
    AssetError, CommitError, ConfigError, EditorError, EditorResult, ReferenceLoadError,
    SessionError, ValidationError,
};
pub use field::{FieldKind, ProductField};
pub use product::{
    DraftSnapshot, EditMode, PersistedRecord, ProductDraft, ProductPayload, ProductRecord,
};
pub use reference::{ReferenceKind, ReferenceOption};
pub use service::{ProductService, QrDetail, QrService, ReferenceService};
pub use validation::{ValidationEngine, ValidationErrorSet};
