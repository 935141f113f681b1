//! In-memory implementations of the editor's collaborators
//!
//! Useful for tests and local development. State lives behind `RwLock`s so a
//! service can be shared as `Arc<dyn _>` while a test keeps a handle to it.

use crate::core::product::{DraftSnapshot, EditMode, PersistedRecord, ProductDraft, ProductRecord};
use crate::core::reference::{ReferenceKind, ReferenceOption};
use crate::core::service::{ProductService, QrDetail, QrService, ReferenceService};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;
use uuid::Uuid;

// =============================================================================
// References
// =============================================================================

/// Reference enumerations held in memory
#[derive(Clone, Default)]
pub struct InMemoryReferenceService {
    options: Arc<RwLock<HashMap<ReferenceKind, Vec<ReferenceOption>>>>,
    failing: Arc<RwLock<HashSet<ReferenceKind>>>,
}

impl InMemoryReferenceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `options` for `kind`
    pub fn with_options(self, kind: ReferenceKind, options: Vec<ReferenceOption>) -> Self {
        if let Ok(mut map) = self.options.write() {
            map.insert(kind, options);
        }
        self
    }

    /// Make every fetch of `kind` fail
    pub fn failing(self, kind: ReferenceKind) -> Self {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(kind);
        }
        self
    }
}

#[async_trait]
impl ReferenceService for InMemoryReferenceService {
    async fn fetch_reference_enumeration(
        &self,
        kind: ReferenceKind,
    ) -> Result<Vec<ReferenceOption>> {
        let failing = self
            .failing
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        if failing.contains(&kind) {
            return Err(anyhow!("{} enumeration is unavailable", kind));
        }

        let options = self
            .options
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(options.get(&kind).cloned().unwrap_or_default())
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product persistence held in memory
///
/// Every snapshot it receives is recorded, including the rejected ones.
#[derive(Clone, Default)]
pub struct InMemoryProductService {
    records: Arc<RwLock<HashMap<String, ProductRecord>>>,
    submissions: Arc<RwLock<Vec<DraftSnapshot>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryProductService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as if it had been persisted earlier
    pub fn with_record(self, record: ProductRecord) -> Self {
        if let (Some(id), Ok(mut records)) = (record.id.clone(), self.records.write()) {
            records.insert(id, record);
        }
        self
    }

    /// Reject the next submission with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some(message.into());
        }
    }

    /// Snapshots received so far, in order
    pub fn submissions(&self) -> Vec<DraftSnapshot> {
        self.submissions
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// A persisted record by id
    pub fn get(&self, id: &str) -> Option<ProductRecord> {
        self.records.read().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn record_from_draft(id: String, draft: &ProductDraft, qr_hash: Option<String>) -> ProductRecord {
    let value = |text: &str| Some(text.trim()).filter(|t| !t.is_empty()).map(str::to_string);

    ProductRecord {
        id: Some(id),
        catalog_id: value(&draft.catalog_id),
        status_id: value(&draft.status_id),
        unit_id: value(&draft.unit_id),
        warehouse_type_id: value(&draft.warehouse_type_id),
        lot_code: value(&draft.lot_code),
        supplier_lot_code: value(&draft.supplier_lot_code),
        serial_number: value(&draft.serial_number),
        manufacturer: value(&draft.manufacturer),
        distributor: value(&draft.distributor),
        intake_date: value(&draft.intake_date),
        expiry_date: value(&draft.expiry_date),
        amount: value(&draft.amount),
        total_amount: value(&draft.total_amount),
        container_count: value(&draft.container_count),
        qr_hash,
    }
}

#[async_trait]
impl ProductService for InMemoryProductService {
    async fn submit_product(&self, snapshot: &DraftSnapshot) -> Result<PersistedRecord> {
        self.submissions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .push(snapshot.clone());

        let failure = self
            .failure
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .take();
        if let Some(message) = failure {
            return Err(anyhow!(message));
        }

        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let draft = snapshot.draft();
        let record = match (snapshot.mode(), draft.id.as_deref()) {
            (EditMode::Create, _) => {
                let id = Uuid::new_v4().to_string();
                let hash = Uuid::new_v4().simple().to_string();
                record_from_draft(id, draft, Some(hash))
            }
            (EditMode::Update, Some(id)) => {
                let existing = records
                    .get(id)
                    .ok_or_else(|| anyhow!("Product not found: {}", id))?;
                record_from_draft(id.to_string(), draft, existing.qr_hash.clone())
            }
            (EditMode::Update, None) => return Err(anyhow!("Cannot update a product without id")),
            (EditMode::View, _) => return Err(anyhow!("Read-only snapshots cannot be saved")),
        };

        if let Some(id) = &record.id {
            records.insert(id.clone(), record.clone());
        }

        Ok(record)
    }
}

// =============================================================================
// QR assets
// =============================================================================

/// QR images and detail records held in memory
///
/// Image fetches for a hash can be held pending with [`hold`](Self::hold)
/// until [`release`](Self::release) is called, to observe in-flight state.
#[derive(Clone, Default)]
pub struct InMemoryQrService {
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    details: Arc<RwLock<HashMap<String, QrDetail>>>,
    image_calls: Arc<RwLock<HashMap<String, usize>>>,
    detail_calls: Arc<RwLock<HashMap<String, usize>>>,
    gates: Arc<RwLock<HashMap<String, Arc<Notify>>>>,
}

impl InMemoryQrService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, hash: &str, bytes: Vec<u8>) -> Self {
        self.insert_image(hash, bytes);
        self
    }

    pub fn with_detail(self, hash: &str, detail: QrDetail) -> Self {
        self.insert_detail(hash, detail);
        self
    }

    pub fn insert_image(&self, hash: &str, bytes: Vec<u8>) {
        if let Ok(mut images) = self.images.write() {
            images.insert(hash.to_string(), bytes);
        }
    }

    pub fn insert_detail(&self, hash: &str, detail: QrDetail) {
        if let Ok(mut details) = self.details.write() {
            details.insert(hash.to_string(), detail);
        }
    }

    /// Keep image fetches of `hash` pending until released
    pub fn hold(&self, hash: &str) {
        if let Ok(mut gates) = self.gates.write() {
            gates
                .entry(hash.to_string())
                .or_insert_with(|| Arc::new(Notify::new()));
        }
    }

    /// Let a held image fetch of `hash` complete
    pub fn release(&self, hash: &str) {
        let gate = self.gates.write().ok().and_then(|mut g| g.remove(hash));
        if let Some(gate) = gate {
            gate.notify_one();
        }
    }

    /// Number of image fetches issued for `hash`
    pub fn image_calls(&self, hash: &str) -> usize {
        Self::count(&self.image_calls, hash)
    }

    /// Number of detail fetches issued for `hash`
    pub fn detail_calls(&self, hash: &str) -> usize {
        Self::count(&self.detail_calls, hash)
    }

    fn count(calls: &RwLock<HashMap<String, usize>>, hash: &str) -> usize {
        calls
            .read()
            .ok()
            .and_then(|c| c.get(hash).copied())
            .unwrap_or_default()
    }

    fn record_call(calls: &RwLock<HashMap<String, usize>>, hash: &str) -> Result<()> {
        let mut calls = calls
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        *calls.entry(hash.to_string()).or_default() += 1;
        Ok(())
    }
}

#[async_trait]
impl QrService for InMemoryQrService {
    async fn fetch_qr_image(&self, hash: &str) -> Result<Vec<u8>> {
        Self::record_call(&self.image_calls, hash)?;

        let gate = self
            .gates
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?
            .get(hash)
            .cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let images = self
            .images
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        images
            .get(hash)
            .cloned()
            .ok_or_else(|| anyhow!("QR image not found: {}", hash))
    }

    async fn fetch_product_by_hash(&self, hash: &str) -> Result<QrDetail> {
        Self::record_call(&self.detail_calls, hash)?;

        let details = self
            .details
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        details
            .get(hash)
            .cloned()
            .ok_or_else(|| anyhow!("Product not found for QR hash: {}", hash))
    }
}
