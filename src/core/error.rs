//! Typed error handling for the product editor
//!
//! Every failure in the editor core is recoverable: validation failures block
//! submission only, reference and asset failures degrade a single surface, and
//! commit failures hand control back to the editable draft.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: the draft did not pass the submission gate
//! - [`ReferenceLoadError`]: one reference enumeration could not be fetched
//! - [`AssetError`]: a QR image or detail record is unavailable
//! - [`CommitError`]: persistence failed after a valid submission
//! - [`SessionError`]: an operation was attempted in the wrong editor state
//! - [`ConfigError`]: configuration could not be loaded
//!
//! # Example
//!
//! ```rust,ignore
//! match session.confirm().await {
//!     Ok(record) => println!("saved {:?}", record.id),
//!     Err(EditorError::Commit(CommitError::Rejected { message, .. })) => {
//!         // the draft is still intact, let the operator retry
//!         println!("could not save: {}", message);
//!     }
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use crate::core::reference::ReferenceKind;
use crate::core::validation::ValidationErrorSet;
use thiserror::Error;

/// The umbrella error type for the editor core
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ReferenceLoad(#[from] ReferenceLoadError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EditorError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EditorError::Validation(e) => e.error_code(),
            EditorError::ReferenceLoad(_) => "REFERENCE_LOAD_FAILED",
            EditorError::Asset(e) => e.error_code(),
            EditorError::Commit(_) => "COMMIT_FAILED",
            EditorError::Session(e) => e.error_code(),
            EditorError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the operator can recover by editing or retrying
    ///
    /// Only configuration errors need a fix outside the editor.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EditorError::Config(_))
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// The draft did not pass the submission gate
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more fields carry error messages
    #[error("{} field(s) failed validation", .0.invalid_count())]
    FieldErrors(ValidationErrorSet),

    /// The typed payload rejected a value the text draft accepted
    #[error("Invalid value for '{field}': {message}")]
    Payload { field: String, message: String },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_FAILED",
            ValidationError::Payload { .. } => "INVALID_PAYLOAD",
        }
    }

    /// The per-field errors, if this failure came from the validation engine
    pub fn field_errors(&self) -> Option<&ValidationErrorSet> {
        match self {
            ValidationError::FieldErrors(set) => Some(set),
            ValidationError::Payload { .. } => None,
        }
    }
}

// =============================================================================
// Reference Load Errors
// =============================================================================

/// One reference enumeration could not be fetched
#[derive(Debug, Clone, Error)]
#[error("Failed to load {kind} options: {message}")]
pub struct ReferenceLoadError {
    pub kind: ReferenceKind,
    pub message: String,
}

// =============================================================================
// Asset Errors
// =============================================================================

/// Errors surfaced by the QR asset cache
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The image fetch failed
    #[error("QR image for '{hash}' is unavailable: {message}")]
    FetchFailed { hash: String, message: String },

    /// The fetched bytes are not a displayable image
    #[error("QR image for '{hash}' could not be decoded: {message}")]
    Undecodable { hash: String, message: String },

    /// A newer request replaced this one before it resolved
    #[error("QR request for '{hash}' was superseded")]
    Superseded { hash: String },

    /// Nothing has resolved yet, so there is nothing to download
    #[error("No QR image is available")]
    Unavailable,
}

impl AssetError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AssetError::FetchFailed { .. } => "ASSET_FETCH_FAILED",
            AssetError::Undecodable { .. } => "ASSET_UNDECODABLE",
            AssetError::Superseded { .. } => "ASSET_SUPERSEDED",
            AssetError::Unavailable => "ASSET_UNAVAILABLE",
        }
    }

    /// Whether the failure was a staleness discard rather than a real failure
    pub fn is_superseded(&self) -> bool {
        matches!(self, AssetError::Superseded { .. })
    }
}

// =============================================================================
// Commit Errors
// =============================================================================

/// Persistence failed after a valid submission
#[derive(Debug, Error)]
pub enum CommitError {
    /// The persistence collaborator returned an error
    #[error("Failed to {operation} product: {message}")]
    Rejected { operation: String, message: String },
}

// =============================================================================
// Session Errors
// =============================================================================

/// An operation was attempted in a state that does not allow it
#[derive(Debug, Error)]
pub enum SessionError {
    /// The editor was opened read-only
    #[error("The product is open read-only")]
    ReadOnly,

    /// The operation needs a snapshot under review
    #[error("Cannot {operation}: nothing is under review")]
    NotReviewing { operation: String },

    /// The operation needs the editable draft
    #[error("Cannot {operation}: a snapshot is under review")]
    AlreadyReviewing { operation: String },

    /// The session was closed
    #[error("The editor session is closed")]
    Closed,

    /// The field name is not part of the product record
    #[error("Unknown product field '{0}'")]
    UnknownField(String),
}

impl SessionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::ReadOnly => "SESSION_READ_ONLY",
            SessionError::NotReviewing { .. } => "SESSION_NOT_REVIEWING",
            SessionError::AlreadyReviewing { .. } => "SESSION_ALREADY_REVIEWING",
            SessionError::Closed => "SESSION_CLOSED",
            SessionError::UnknownField(_) => "UNKNOWN_FIELD",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Result alias used across the editor core
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = EditorError::from(AssetError::Unavailable);
        assert_eq!(err.error_code(), "ASSET_UNAVAILABLE");

        let err = EditorError::from(SessionError::ReadOnly);
        assert_eq!(err.error_code(), "SESSION_READ_ONLY");

        let err = EditorError::from(CommitError::Rejected {
            operation: "create".to_string(),
            message: "boom".to_string(),
        });
        assert_eq!(err.error_code(), "COMMIT_FAILED");
    }

    #[test]
    fn test_commit_error_message() {
        let err = CommitError::Rejected {
            operation: "update".to_string(),
            message: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to update product: timeout");
    }

    #[test]
    fn test_reference_error_names_kind() {
        let err = ReferenceLoadError {
            kind: ReferenceKind::WarehouseType,
            message: "503".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load warehouse type options: 503");
    }

    #[test]
    fn test_superseded_is_detected() {
        assert!(
            AssetError::Superseded {
                hash: "abc".to_string()
            }
            .is_superseded()
        );
        assert!(!AssetError::Unavailable.is_superseded());
    }
}
