//! The mutable working copy of the product being edited

use crate::core::error::SessionError;
use crate::core::field::ProductField;
use crate::core::product::{DEFAULT_DATE_FORMAT, EditMode, ProductDraft, ProductRecord};
use crate::core::validation::{ValidationEngine, ValidationErrorSet};

/// Ticket for an identity switch whose source record resolves asynchronously
///
/// Only the most recently issued ticket can apply its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTicket(u64);

/// Owner of the in-progress draft and its field errors
#[derive(Debug, Clone)]
pub struct DraftStore {
    mode: EditMode,
    source_id: Option<String>,
    initial: ProductDraft,
    draft: ProductDraft,
    errors: ValidationErrorSet,
    generation: u64,
    date_format: String,
}

impl DraftStore {
    /// Store with an empty draft
    pub fn new(mode: EditMode) -> Self {
        Self {
            mode,
            source_id: None,
            initial: ProductDraft::default(),
            draft: ProductDraft::default(),
            errors: ValidationErrorSet::new(),
            generation: 0,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Render dates loaded from source records in this format
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Build the working draft from the source record
    ///
    /// Create mode and a missing source both give empty defaults. Any pending
    /// identity switch is invalidated.
    pub fn initialize(&mut self, source: Option<&ProductRecord>) -> &ProductDraft {
        self.generation += 1;
        self.load(source);
        &self.draft
    }

    /// Re-initialize only if the source identity differs from the current one
    ///
    /// Returns whether the draft was replaced. The same identity keeps the
    /// operator's edits.
    pub fn sync_source(&mut self, source: Option<&ProductRecord>) -> bool {
        let incoming = self.effective_identity(source);
        if incoming == self.source_id {
            return false;
        }
        tracing::debug!(
            from = ?self.source_id,
            to = ?incoming,
            "Source record changed, replacing draft"
        );
        self.initialize(source);
        true
    }

    /// Start an identity switch whose record is still being fetched
    pub fn begin_switch(&mut self) -> SwitchTicket {
        self.generation += 1;
        SwitchTicket(self.generation)
    }

    /// Apply the record of a switch if no newer switch or initialize happened
    pub fn complete_switch(&mut self, ticket: SwitchTicket, source: Option<&ProductRecord>) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding stale source record"
            );
            return false;
        }
        self.load(source);
        true
    }

    /// Replace one field and re-run that field's validator chain
    ///
    /// Returns the field's new error list. Other fields' errors are untouched.
    pub fn apply_change(
        &mut self,
        engine: &ValidationEngine,
        field: ProductField,
        value: impl Into<String>,
    ) -> Result<&[String], SessionError> {
        if !self.mode.is_editable() {
            return Err(SessionError::ReadOnly);
        }
        self.draft.set(field, value);
        let errors = engine.validate_field(field, self.draft.get(field));
        self.errors.set(field, errors);
        Ok(self.errors.get(field))
    }

    /// Restore the last initialized draft and clear all errors
    pub fn reset(&mut self) {
        self.draft = self.initial.clone();
        self.errors.clear();
    }

    /// Drop the draft entirely, as after a close or a successful commit
    pub fn discard(&mut self) {
        self.generation += 1;
        self.source_id = None;
        self.initial = ProductDraft::default();
        self.draft = ProductDraft::default();
        self.errors.clear();
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    pub(crate) fn set_errors(&mut self, errors: ValidationErrorSet) {
        self.errors = errors;
    }

    pub(crate) fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Whether the draft differs from what was initialized
    pub fn is_dirty(&self) -> bool {
        self.draft != self.initial
    }

    fn effective_identity(&self, source: Option<&ProductRecord>) -> Option<String> {
        match self.mode {
            EditMode::Create => None,
            _ => source.and_then(|record| record.identity().map(str::to_string)),
        }
    }

    fn load(&mut self, source: Option<&ProductRecord>) {
        let draft = match (self.mode, source) {
            (EditMode::Create, _) | (_, None) => ProductDraft::default(),
            (_, Some(record)) => ProductDraft::from_record_with_format(record, &self.date_format),
        };
        self.source_id = self.effective_identity(source);
        self.initial = draft.clone();
        self.draft = draft;
        self.errors.clear();
    }
}
