//! Lifecycle of the QR viewer opened for one product

use super::cache::{AssetCache, AssetStatus, QrAsset};
use super::download::QrDownload;
use crate::config::ViewerConfig;
use crate::core::error::AssetError;
use crate::core::product::ProductRecord;
use crate::core::service::QrService;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fields shown next to the QR image
///
/// Values from the detail record win over the ones carried by the handle the
/// viewer was opened with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrDisplay {
    pub qr_hash: Option<String>,
    pub name: Option<String>,
    pub lot_code: Option<String>,
    pub supplier_lot_code: Option<String>,
    pub intake_date: Option<String>,
    pub expiry_date: Option<String>,
    pub reanalysis_date: Option<String>,
    pub sampling_date: Option<String>,
    pub created_at: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub distributor: Option<String>,
}

impl QrDisplay {
    fn merge(handle: &ProductRecord, asset: &QrAsset) -> Self {
        let detail = asset.detail.as_ref();
        let pick = |from_detail: Option<&Option<String>>, from_handle: &Option<String>| {
            from_detail
                .and_then(Option::clone)
                .or_else(|| from_handle.clone())
        };

        Self {
            qr_hash: Some(asset.hash.clone()),
            name: detail.and_then(|d| d.name.clone()),
            lot_code: pick(detail.map(|d| &d.record.lot_code), &handle.lot_code),
            supplier_lot_code: pick(
                detail.map(|d| &d.record.supplier_lot_code),
                &handle.supplier_lot_code,
            ),
            intake_date: pick(detail.map(|d| &d.record.intake_date), &handle.intake_date),
            expiry_date: pick(detail.map(|d| &d.record.expiry_date), &handle.expiry_date),
            reanalysis_date: detail.and_then(|d| d.reanalysis_date.clone()),
            sampling_date: detail.and_then(|d| d.sampling_date.clone()),
            created_at: detail.and_then(|d| d.created_at.clone()),
            serial_number: pick(detail.map(|d| &d.record.serial_number), &handle.serial_number),
            manufacturer: pick(detail.map(|d| &d.record.manufacturer), &handle.manufacturer),
            distributor: pick(detail.map(|d| &d.record.distributor), &handle.distributor),
        }
    }
}

/// The QR view of one product record
///
/// All methods take `&self`, so a viewer can be shared between the task that
/// drives it and the tasks awaiting its fetches.
pub struct QrViewer {
    cache: AssetCache,
    config: ViewerConfig,
    handle: Mutex<Option<ProductRecord>>,
}

impl QrViewer {
    pub fn new(service: Arc<dyn QrService>, config: &ViewerConfig) -> Self {
        Self {
            cache: AssetCache::new(service, config.fetch_detail),
            config: config.clone(),
            handle: Mutex::new(None),
        }
    }

    /// Show `handle` and resolve its QR image
    ///
    /// A record without a QR hash has nothing to show and reports
    /// [`AssetError::Unavailable`].
    pub async fn open(&self, handle: ProductRecord) -> Result<Arc<QrAsset>, AssetError> {
        let hash = handle.qr_hash.clone().filter(|h| !h.trim().is_empty());
        *self.lock_handle() = Some(handle);

        match hash {
            Some(hash) => self.cache.resolve(&hash).await,
            None => {
                tracing::debug!("Record has no QR hash");
                self.cache.clear();
                Err(AssetError::Unavailable)
            }
        }
    }

    /// Point the open viewer at another record
    ///
    /// Results still pending for the previous record are discarded.
    pub async fn switch_identity(&self, handle: ProductRecord) -> Result<Arc<QrAsset>, AssetError> {
        self.open(handle).await
    }

    /// Close the viewer and evict its cache
    pub fn close(&self) {
        self.lock_handle().take();
        self.cache.clear();
    }

    pub fn status(&self) -> AssetStatus {
        self.cache.status()
    }

    /// Fields to show for the resolved record, once its image is available
    pub fn display(&self) -> Option<QrDisplay> {
        let asset = self.cache.current()?;
        let handle = self.lock_handle();
        let handle = handle.as_ref()?;
        Some(QrDisplay::merge(handle, &asset))
    }

    /// The resolved image named after the open record
    pub fn download(&self) -> Result<QrDownload, AssetError> {
        let handle = self.lock_handle().clone().ok_or(AssetError::Unavailable)?;
        self.cache.download(&handle, &self.config)
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<ProductRecord>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
