//! Two-phase edit → review → commit protocol
//!
//! ```text
//!            submit (validate_all passes)          confirm ok
//!  Editing ─────────────────────────────▶ Reviewing ───────────▶ Committed
//!     ▲                                      │
//!     └──────── cancel / confirm failed ─────┘
//! ```

use super::draft::DraftStore;
use crate::core::error::{CommitError, EditorError, SessionError, ValidationError};
use crate::core::field::ProductField;
use crate::core::product::{DEFAULT_DATE_FORMAT, DraftSnapshot, PersistedRecord};
use crate::core::service::ProductService;
use crate::core::validation::{ValidationEngine, validators};
use std::sync::Arc;

/// Where the handoff currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum HandoffState {
    /// The draft is mutable
    Editing,
    /// A frozen snapshot awaits confirmation
    Reviewing(Arc<DraftSnapshot>),
    /// The snapshot was persisted
    Committed(PersistedRecord),
}

impl HandoffState {
    pub fn name(&self) -> &'static str {
        match self {
            HandoffState::Editing => "editing",
            HandoffState::Reviewing(_) => "reviewing",
            HandoffState::Committed(_) => "committed",
        }
    }
}

/// Drives a validated draft through review to persistence
#[derive(Debug, Clone)]
pub struct ConfirmationHandoff {
    state: HandoffState,
    notice: Option<String>,
    date_format: String,
}

impl Default for ConfirmationHandoff {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl ConfirmationHandoff {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            state: HandoffState::Editing,
            notice: None,
            date_format: date_format.into(),
        }
    }

    pub fn state(&self) -> &HandoffState {
        &self.state
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self.state, HandoffState::Reviewing(_))
    }

    /// The snapshot under review, if any
    pub fn snapshot(&self) -> Option<&DraftSnapshot> {
        match &self.state {
            HandoffState::Reviewing(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Gate the draft and freeze it for review
    ///
    /// `validate_all` is re-run here regardless of the per-field results the
    /// store already holds. On failure the full error set is written back to
    /// the store and the machine stays in `Editing`.
    pub fn submit(
        &mut self,
        store: &mut DraftStore,
        engine: &ValidationEngine,
    ) -> Result<Arc<DraftSnapshot>, EditorError> {
        if !store.mode().is_editable() {
            return Err(SessionError::ReadOnly.into());
        }
        match self.state {
            HandoffState::Editing => {}
            HandoffState::Reviewing(_) => {
                return Err(SessionError::AlreadyReviewing {
                    operation: "submit".to_string(),
                }
                .into());
            }
            HandoffState::Committed(_) => return Err(SessionError::Closed.into()),
        }

        let mut errors = engine.validate_all(store.draft());
        let required = validators::required();
        for field in ProductField::required() {
            if errors.is_valid(field) {
                if let Err(message) = required(field.label(), store.draft().get(field)) {
                    errors.set(field, vec![message]);
                }
            }
        }

        if !errors.is_submittable() {
            tracing::debug!(invalid = errors.invalid_count(), "Submission blocked by validation");
            store.set_errors(errors.clone());
            return Err(ValidationError::FieldErrors(errors).into());
        }

        let snapshot = DraftSnapshot::new(store.mode(), store.draft());
        if let Err(err) = snapshot.to_payload(&self.date_format) {
            if let ValidationError::Payload { field, message } = &err {
                if let Ok(field) = field.parse::<ProductField>() {
                    errors.set(field, vec![message.clone()]);
                }
            }
            tracing::debug!(error = %err, "Submission blocked by payload conversion");
            store.set_errors(errors);
            return Err(err.into());
        }

        store.clear_errors();
        let snapshot = Arc::new(snapshot);
        self.state = HandoffState::Reviewing(Arc::clone(&snapshot));
        self.notice = None;
        tracing::info!(
            mode = %snapshot.mode(),
            lot = %snapshot.get(ProductField::LotCode),
            "Draft frozen for review"
        );
        Ok(snapshot)
    }

    /// Whether the draft converts into a submission payload
    pub fn accepts(&self, store: &DraftStore) -> bool {
        DraftSnapshot::new(store.mode(), store.draft())
            .to_payload(&self.date_format)
            .is_ok()
    }

    /// Leave review and return to the editable draft
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if !self.is_reviewing() {
            return Err(SessionError::NotReviewing {
                operation: "cancel".to_string(),
            });
        }
        self.state = HandoffState::Editing;
        tracing::debug!("Review cancelled");
        Ok(())
    }

    /// Persist the snapshot under review
    ///
    /// On failure the machine goes back to `Editing`, the draft is untouched
    /// and a notice is left for the operator.
    pub async fn confirm(
        &mut self,
        service: &dyn ProductService,
    ) -> Result<PersistedRecord, EditorError> {
        let snapshot = match &self.state {
            HandoffState::Reviewing(snapshot) => Arc::clone(snapshot),
            _ => {
                return Err(SessionError::NotReviewing {
                    operation: "confirm".to_string(),
                }
                .into());
            }
        };

        match service.submit_product(&snapshot).await {
            Ok(record) => {
                tracing::info!(
                    mode = %snapshot.mode(),
                    id = ?record.id,
                    "Product committed"
                );
                self.state = HandoffState::Committed(record.clone());
                self.notice = None;
                Ok(record)
            }
            Err(e) => {
                let err = CommitError::Rejected {
                    operation: snapshot.mode().operation().to_string(),
                    message: e.to_string(),
                };
                tracing::warn!(error = %e, "Product commit failed, returning to editing");
                self.state = HandoffState::Editing;
                self.notice = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Take the transient notice left by a failed commit
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Back to `Editing` with no notice
    pub fn reset(&mut self) {
        self.state = HandoffState::Editing;
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::product::{EditMode, ProductRecord};
    use crate::storage::InMemoryProductService;

    fn filled_store(mode: EditMode) -> DraftStore {
        let engine = ValidationEngine::product();
        let mut store = DraftStore::new(mode);
        store.initialize(None);
        for (field, value) in [
            (ProductField::CatalogId, "1"),
            (ProductField::StatusId, "2"),
            (ProductField::UnitId, "3"),
            (ProductField::WarehouseTypeId, "4"),
            (ProductField::LotCode, "L1"),
            (ProductField::SupplierLotCode, "P1"),
            (ProductField::IntakeDate, "2024-01-01"),
            (ProductField::ExpiryDate, "2024-12-31"),
            (ProductField::Amount, "5"),
            (ProductField::TotalAmount, "10"),
            (ProductField::ContainerCount, "2"),
        ] {
            store.apply_change(&engine, field, value).unwrap();
        }
        store
    }

    #[test]
    fn test_submit_enters_review() {
        let engine = ValidationEngine::product();
        let mut store = filled_store(EditMode::Create);
        let mut handoff = ConfirmationHandoff::default();

        let snapshot = handoff.submit(&mut store, &engine).unwrap();

        assert!(handoff.is_reviewing());
        assert_eq!(snapshot.get(ProductField::LotCode), "L1");
        assert_eq!(handoff.snapshot(), Some(snapshot.as_ref()));
    }

    #[test]
    fn test_submit_with_errors_stays_editing() {
        let engine = ValidationEngine::product();
        let mut store = filled_store(EditMode::Create);
        store
            .apply_change(&engine, ProductField::LotCode, "")
            .unwrap();
        let mut handoff = ConfirmationHandoff::default();

        let err = handoff.submit(&mut store, &engine).unwrap_err();

        assert_eq!(handoff.state(), &HandoffState::Editing);
        let EditorError::Validation(ValidationError::FieldErrors(errors)) = err else {
            panic!("expected field errors");
        };
        assert_eq!(errors.get(ProductField::LotCode).len(), 1);
        assert_eq!(store.errors(), &errors);
    }

    #[test]
    fn test_submit_does_not_trust_keystroke_results() {
        // an engine without rules never reports anything per keystroke
        let lenient = ValidationEngine::new();
        let mut store = DraftStore::new(EditMode::Create);
        store.initialize(None);
        store
            .apply_change(&lenient, ProductField::Amount, "12")
            .unwrap();
        assert!(store.errors().is_submittable());

        let mut handoff = ConfirmationHandoff::default();
        let err = handoff.submit(&mut store, &lenient).unwrap_err();

        assert!(matches!(err, EditorError::Validation(_)));
        assert!(!store.errors().is_valid(ProductField::LotCode));
    }

    #[test]
    fn test_payload_failure_is_written_to_field_errors() {
        let lenient = ValidationEngine::new();
        let mut store = filled_store(EditMode::Create);
        store
            .apply_change(&lenient, ProductField::ContainerCount, "5000000000")
            .unwrap();
        let mut handoff = ConfirmationHandoff::default();
        assert!(!handoff.accepts(&store));

        let err = handoff.submit(&mut store, &lenient).unwrap_err();

        assert_eq!(err.error_code(), "INVALID_PAYLOAD");
        assert_eq!(handoff.state(), &HandoffState::Editing);
        assert_eq!(store.errors().get(ProductField::ContainerCount).len(), 1);
        assert!(store.errors().is_valid(ProductField::LotCode));
    }

    #[test]
    fn test_submit_rejected_in_view_mode() {
        let engine = ValidationEngine::product();
        let mut store = DraftStore::new(EditMode::View);
        store.initialize(Some(&ProductRecord::default()));
        let mut handoff = ConfirmationHandoff::default();

        let err = handoff.submit(&mut store, &engine).unwrap_err();
        assert!(matches!(err, EditorError::Session(SessionError::ReadOnly)));
    }

    #[test]
    fn test_cancel_returns_to_editing_with_draft_intact() {
        let engine = ValidationEngine::product();
        let mut store = filled_store(EditMode::Create);
        let mut handoff = ConfirmationHandoff::default();
        handoff.submit(&mut store, &engine).unwrap();

        handoff.cancel().unwrap();

        assert_eq!(handoff.state(), &HandoffState::Editing);
        assert_eq!(store.draft().lot_code, "L1");
        assert!(handoff.cancel().is_err());
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let engine = ValidationEngine::product();
        let mut store = filled_store(EditMode::Create);
        let mut handoff = ConfirmationHandoff::default();
        handoff.submit(&mut store, &engine).unwrap();

        let err = handoff.submit(&mut store, &engine).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Session(SessionError::AlreadyReviewing { .. })
        ));
    }

    #[tokio::test]
    async fn test_confirm_commits_frozen_values() {
        let engine = ValidationEngine::product();
        let service = InMemoryProductService::new();
        let mut store = filled_store(EditMode::Create);
        let mut handoff = ConfirmationHandoff::default();
        handoff.submit(&mut store, &engine).unwrap();

        // edits after submission never reach the snapshot
        store
            .apply_change(&engine, ProductField::LotCode, "LATE")
            .unwrap();

        let record = handoff.confirm(&service).await.unwrap();

        assert_eq!(record.lot_code.as_deref(), Some("L1"));
        assert!(matches!(handoff.state(), HandoffState::Committed(_)));
        assert_eq!(service.submissions()[0].get(ProductField::LotCode), "L1");
    }

    #[tokio::test]
    async fn test_confirm_failure_returns_to_editing() {
        let engine = ValidationEngine::product();
        let service = InMemoryProductService::new();
        service.fail_next("backend unavailable");
        let mut store = filled_store(EditMode::Create);
        let before = store.draft().clone();
        let mut handoff = ConfirmationHandoff::default();
        handoff.submit(&mut store, &engine).unwrap();

        let err = handoff.confirm(&service).await.unwrap_err();

        assert!(matches!(err, EditorError::Commit(_)));
        assert_eq!(handoff.state(), &HandoffState::Editing);
        assert_eq!(store.draft(), &before);
        let notice = handoff.take_notice().unwrap();
        assert!(notice.contains("backend unavailable"));
        assert!(handoff.take_notice().is_none());
    }

    #[tokio::test]
    async fn test_confirm_requires_review() {
        let service = InMemoryProductService::new();
        let mut handoff = ConfirmationHandoff::default();

        let err = handoff.confirm(&service).await.unwrap_err();
        assert!(matches!(
            err,
            EditorError::Session(SessionError::NotReviewing { .. })
        ));
    }
}
