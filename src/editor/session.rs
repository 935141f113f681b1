//! Explicit lifecycle of one product editor
//!
//! A session is opened for a source record and an [`EditMode`], loads the
//! reference catalog once, and owns the draft store and the confirmation
//! handoff until it is closed or a commit succeeds.

use super::catalog::{ReferenceCatalog, ReferenceCatalogLoader};
use super::draft::{DraftStore, SwitchTicket};
use super::handoff::{ConfirmationHandoff, HandoffState};
use crate::config::EditorConfig;
use crate::core::error::{EditorError, EditorResult, SessionError};
use crate::core::field::ProductField;
use crate::core::product::{DraftSnapshot, EditMode, PersistedRecord, ProductDraft, ProductRecord};
use crate::core::service::{ProductService, ReferenceService};
use crate::core::validation::{ValidationEngine, ValidationErrorSet};
use std::sync::Arc;
use uuid::Uuid;

/// Collaborators an editor session talks to
#[derive(Clone)]
pub struct EditorServices {
    pub references: Arc<dyn ReferenceService>,
    pub products: Arc<dyn ProductService>,
}

impl EditorServices {
    pub fn new(references: Arc<dyn ReferenceService>, products: Arc<dyn ProductService>) -> Self {
        Self {
            references,
            products,
        }
    }
}

/// One open product editor
pub struct EditorSession {
    id: Uuid,
    engine: ValidationEngine,
    catalog: ReferenceCatalog,
    store: DraftStore,
    handoff: ConfirmationHandoff,
    products: Arc<dyn ProductService>,
    open: bool,
}

impl EditorSession {
    /// Open the editor for `source`
    ///
    /// The reference catalog is fetched (four parallel calls) while the draft
    /// is built from the source record. Catalog failures never prevent the
    /// session from opening.
    pub async fn open(
        services: &EditorServices,
        config: &EditorConfig,
        source: Option<&ProductRecord>,
        mode: EditMode,
    ) -> Self {
        let id = Uuid::new_v4();
        let loader = ReferenceCatalogLoader::new(Arc::clone(&services.references));

        let mut store = DraftStore::new(mode).with_date_format(&config.validation.date_format);
        store.initialize(source);
        let catalog = loader.load().await;

        tracing::info!(
            session_id = %id,
            mode = %mode,
            source_id = ?store.source_id(),
            unavailable = catalog.failures().len(),
            "Editor session opened"
        );

        Self {
            id,
            engine: ValidationEngine::from_config(&config.validation),
            catalog,
            store,
            handoff: ConfirmationHandoff::new(config.validation.date_format.clone()),
            products: Arc::clone(&services.products),
            open: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> EditMode {
        self.store.mode()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    pub fn draft(&self) -> &ProductDraft {
        self.store.draft()
    }

    pub fn errors(&self) -> &ValidationErrorSet {
        self.store.errors()
    }

    pub fn state(&self) -> &HandoffState {
        self.handoff.state()
    }

    /// The snapshot under review, if any
    pub fn snapshot(&self) -> Option<&DraftSnapshot> {
        self.handoff.snapshot()
    }

    /// Replace one field and return its immediate errors
    pub fn apply_change(
        &mut self,
        field: ProductField,
        value: impl Into<String>,
    ) -> EditorResult<Vec<String>> {
        self.ensure_open()?;
        let errors = self.store.apply_change(&self.engine, field, value)?;
        Ok(errors.to_vec())
    }

    /// [`apply_change`](Self::apply_change) addressed by wire name
    pub fn apply_named_change(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> EditorResult<Vec<String>> {
        let field: ProductField = name.parse()?;
        self.apply_change(field, value)
    }

    /// Whether the submit action should be enabled
    pub fn can_submit(&self) -> bool {
        self.open
            && self.mode().is_editable()
            && !self.handoff.is_reviewing()
            && self.engine.can_submit(self.store.draft())
            && self.handoff.accepts(&self.store)
    }

    /// Validate the whole draft and move to review
    pub fn submit(&mut self) -> EditorResult<Arc<DraftSnapshot>> {
        self.ensure_open()?;
        self.handoff.submit(&mut self.store, &self.engine)
    }

    /// Leave review, keeping the draft and the loaded catalog
    pub fn cancel_review(&mut self) -> EditorResult<()> {
        self.ensure_open()?;
        Ok(self.handoff.cancel()?)
    }

    /// Persist the snapshot under review
    ///
    /// On success the draft is discarded and the session closes. On failure
    /// the session stays open in `Editing` and a notice is available through
    /// [`take_notice`](Self::take_notice).
    pub async fn confirm(&mut self) -> EditorResult<PersistedRecord> {
        self.ensure_open()?;
        let record = self.handoff.confirm(self.products.as_ref()).await?;
        self.store.discard();
        self.open = false;
        tracing::info!(session_id = %self.id, "Editor session closed after commit");
        Ok(record)
    }

    /// Take the transient notice left by a failed commit
    pub fn take_notice(&mut self) -> Option<String> {
        self.handoff.take_notice()
    }

    /// Restore the draft as it was opened and clear errors
    pub fn reset(&mut self) {
        self.store.reset();
        self.handoff.reset();
    }

    /// Point the open editor at another source record
    ///
    /// A different identity replaces the draft and abandons any review; the
    /// same identity is a no-op. The catalog is not reloaded.
    pub fn switch_identity(&mut self, source: Option<&ProductRecord>) -> EditorResult<bool> {
        self.ensure_open()?;
        let replaced = self.store.sync_source(source);
        if replaced {
            self.handoff.reset();
        }
        Ok(replaced)
    }

    /// Start a switch to a record that is still being fetched
    pub fn begin_switch(&mut self) -> SwitchTicket {
        self.store.begin_switch()
    }

    /// Finish a switch started with [`begin_switch`](Self::begin_switch)
    ///
    /// Returns `false` when a newer switch superseded this one.
    pub fn finish_switch(
        &mut self,
        ticket: SwitchTicket,
        source: Option<&ProductRecord>,
    ) -> EditorResult<bool> {
        self.ensure_open()?;
        let applied = self.store.complete_switch(ticket, source);
        if applied {
            self.handoff.reset();
        }
        Ok(applied)
    }

    /// Switch to a record that is still being fetched
    ///
    /// The session stays borrowed until `fetch` resolves, so nothing can
    /// overtake this switch through the same session. It does supersede any
    /// ticket handed out earlier by [`begin_switch`](Self::begin_switch).
    /// Callers that need overlapping switches drive
    /// [`begin_switch`](Self::begin_switch) and
    /// [`finish_switch`](Self::finish_switch) themselves. A failed fetch leaves
    /// the current draft in place.
    pub async fn switch_identity_with<F>(&mut self, fetch: F) -> EditorResult<bool>
    where
        F: Future<Output = anyhow::Result<Option<ProductRecord>>>,
    {
        self.ensure_open()?;
        let ticket = self.begin_switch();
        match fetch.await {
            Ok(source) => self.finish_switch(ticket, source.as_ref()),
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Source record unavailable");
                Ok(false)
            }
        }
    }

    /// Close the editor and drop the draft
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.store.discard();
        self.handoff.reset();
        self.open = false;
        tracing::info!(session_id = %self.id, "Editor session closed");
    }

    fn ensure_open(&self) -> Result<(), EditorError> {
        if self.open {
            Ok(())
        } else {
            Err(SessionError::Closed.into())
        }
    }
}
