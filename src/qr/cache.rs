//! Coalescing, staleness-guarded cache of QR assets
//!
//! The cache follows one hash at a time: the hash the open viewer is showing.
//!
//! - Concurrent [`AssetCache::resolve`] calls for the same hash share a single
//!   in-flight fetch (`futures::future::Shared`).
//! - Every change of the hash of interest bumps a generation counter. A fetch
//!   result is applied only if the generation it was issued under is still
//!   current when it arrives; otherwise it is discarded as superseded.
//! - The underlying network calls are never cancelled, only ignored.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`.

use crate::config::ViewerConfig;
use crate::core::error::AssetError;
use crate::core::product::ProductRecord;
use crate::core::service::{QrDetail, QrService};
use crate::qr::download::{self, QrDownload};
use crate::qr::image::DecodedImage;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Image and optional detail record resolved for one hash
#[derive(Debug, Clone, PartialEq)]
pub struct QrAsset {
    pub hash: String,
    pub image: DecodedImage,
    pub detail: Option<QrDetail>,
    pub fetched_at: DateTime<Utc>,
}

/// What the viewer should show for the current hash
#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    /// No hash requested
    Idle,
    /// A fetch for the current hash is pending
    Loading,
    /// The asset is cached
    Ready(Arc<QrAsset>),
    /// The last fetch for the current hash failed
    Unavailable(AssetError),
}

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<QrAsset>, AssetError>>>;

#[derive(Default)]
struct CacheState {
    generation: u64,
    current: Option<String>,
    entry: Option<Arc<QrAsset>>,
    failure: Option<AssetError>,
    in_flight: HashMap<String, SharedFetch>,
    fetches: u64,
}

impl CacheState {
    /// Make `hash` the hash of interest, evicting whatever was cached
    ///
    /// Fetches for other hashes are forgotten; callers still awaiting them
    /// hold their own handle.
    fn focus(&mut self, hash: Option<&str>) {
        self.generation += 1;
        self.current = hash.map(str::to_string);
        self.entry = None;
        self.failure = None;
        self.in_flight.retain(|pending, _| Some(pending.as_str()) == hash);
    }

    fn is_current(&self, hash: &str, token: u64) -> bool {
        self.generation == token && self.current.as_deref() == Some(hash)
    }
}

/// Resolves QR hashes to images for the lifetime of one open viewer
pub struct AssetCache {
    service: Arc<dyn QrService>,
    fetch_detail: bool,
    state: Mutex<CacheState>,
}

impl AssetCache {
    /// Create a cache; `fetch_detail` also loads the record behind each hash
    pub fn new(service: Arc<dyn QrService>, fetch_detail: bool) -> Self {
        Self {
            service,
            fetch_detail,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Resolve `hash` to its asset
    ///
    /// Returns the cached asset when `hash` is already resolved, joins the
    /// in-flight fetch when one is pending, and starts a fetch otherwise.
    /// Returns [`AssetError::Superseded`] if another hash was requested (or the
    /// cache was cleared) before this fetch resolved.
    pub async fn resolve(&self, hash: &str) -> Result<Arc<QrAsset>, AssetError> {
        let (token, fetch) = {
            let mut state = self.lock();

            if state.current.as_deref() != Some(hash) {
                tracing::debug!(hash = %hash, previous = ?state.current, "Switching QR hash");
                state.focus(Some(hash));
            } else if let Some(asset) = &state.entry {
                return Ok(Arc::clone(asset));
            }

            let token = state.generation;
            let fetch = match state.in_flight.get(hash) {
                Some(fetch) => {
                    tracing::debug!(hash = %hash, "Joining in-flight QR fetch");
                    fetch.clone()
                }
                None => {
                    let fetch = self.start_fetch(hash);
                    state.in_flight.insert(hash.to_string(), fetch.clone());
                    state.fetches += 1;
                    fetch
                }
            };
            (token, fetch)
        };

        let result = fetch.clone().await;

        let mut state = self.lock();
        if state
            .in_flight
            .get(hash)
            .is_some_and(|pending| pending.ptr_eq(&fetch))
        {
            state.in_flight.remove(hash);
        }

        if !state.is_current(hash, token) {
            tracing::debug!(hash = %hash, "Discarding superseded QR result");
            return Err(AssetError::Superseded {
                hash: hash.to_string(),
            });
        }

        match result {
            Ok(asset) => {
                state.entry = Some(Arc::clone(&asset));
                state.failure = None;
                Ok(asset)
            }
            Err(err) => {
                state.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Forget the current hash and everything cached for it
    ///
    /// Pending fetches keep running but their results will be discarded.
    pub fn clear(&self) {
        let mut state = self.lock();
        if state.current.is_some() {
            tracing::debug!(hash = ?state.current, "Clearing QR cache");
        }
        state.focus(None);
    }

    /// The hash of interest, if any
    pub fn current_hash(&self) -> Option<String> {
        self.lock().current.clone()
    }

    /// The resolved asset of the current hash, if any
    pub fn current(&self) -> Option<Arc<QrAsset>> {
        self.lock().entry.clone()
    }

    pub fn status(&self) -> AssetStatus {
        let state = self.lock();
        match (&state.current, &state.entry, &state.failure) {
            (None, _, _) => AssetStatus::Idle,
            (Some(_), Some(asset), _) => AssetStatus::Ready(Arc::clone(asset)),
            (Some(_), None, Some(err)) => AssetStatus::Unavailable(err.clone()),
            (Some(_), None, None) => AssetStatus::Loading,
        }
    }

    /// The cached image of `record`, named for saving
    ///
    /// Fails with [`AssetError::Unavailable`] unless the record's hash is the
    /// current one and its image has resolved.
    pub fn download(
        &self,
        record: &ProductRecord,
        config: &ViewerConfig,
    ) -> Result<QrDownload, AssetError> {
        let asset = self.current().ok_or(AssetError::Unavailable)?;
        if record.qr_hash.as_deref() != Some(asset.hash.as_str()) {
            return Err(AssetError::Unavailable);
        }
        let image = &asset.image;
        Ok(QrDownload {
            file_name: download::file_name(config, record, image.format()),
            mime: image.mime(),
            bytes: image.bytes(),
        })
    }

    /// Number of underlying fetches started since the cache was created
    pub fn fetch_count(&self) -> u64 {
        self.lock().fetches
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Image and detail are fetched concurrently; a failed detail fetch only
    /// drops the detail.
    fn start_fetch(&self, hash: &str) -> SharedFetch {
        let service = Arc::clone(&self.service);
        let fetch_detail = self.fetch_detail;
        let hash = hash.to_string();

        async move {
            tracing::debug!(hash = %hash, fetch_detail, "Fetching QR asset");

            let image = async {
                service
                    .fetch_qr_image(&hash)
                    .await
                    .map_err(|e| AssetError::FetchFailed {
                        hash: hash.clone(),
                        message: e.to_string(),
                    })
            };
            let detail = async {
                if !fetch_detail {
                    return None;
                }
                match service.fetch_product_by_hash(&hash).await {
                    Ok(detail) => Some(detail),
                    Err(e) => {
                        tracing::warn!(hash = %hash, error = %e, "QR detail record unavailable");
                        None
                    }
                }
            };

            let (image, detail) = futures::join!(image, detail);
            let image = match image.and_then(|bytes| DecodedImage::decode(&hash, bytes)) {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!(hash = %hash, error = %e, "QR image unavailable");
                    return Err(e);
                }
            };

            Ok::<_, AssetError>(Arc::new(QrAsset {
                hash: hash.clone(),
                image,
                detail,
                fetched_at: Utc::now(),
            }))
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryQrService;
    use tokio_test::{assert_pending, assert_ready, task};

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[tokio::test]
    async fn test_abandoned_fetch_is_forgotten_on_clear() {
        let service = Arc::new(InMemoryQrService::new().with_image("abc123", PNG.to_vec()));
        service.hold("abc123");
        let cache = AssetCache::new(service.clone(), false);

        let mut pending = task::spawn(cache.resolve("abc123"));
        assert_pending!(pending.poll());
        assert_eq!(cache.lock().in_flight.len(), 1);
        drop(pending);

        cache.clear();

        assert!(cache.lock().in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_switching_hash_forgets_other_fetches() {
        let service = Arc::new(
            InMemoryQrService::new()
                .with_image("abc123", PNG.to_vec())
                .with_image("def456", PNG.to_vec()),
        );
        service.hold("abc123");
        service.hold("def456");
        let cache = AssetCache::new(service.clone(), false);

        let mut first = task::spawn(cache.resolve("abc123"));
        assert_pending!(first.poll());
        drop(first);

        let mut second = task::spawn(cache.resolve("def456"));
        assert_pending!(second.poll());

        {
            let state = cache.lock();
            assert_eq!(state.in_flight.len(), 1);
            assert!(state.in_flight.contains_key("def456"));
        }

        service.release("def456");
        let asset = assert_ready!(second.poll()).unwrap();
        assert_eq!(asset.hash, "def456");
        assert!(cache.lock().in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_caches_asset() {
        let service = Arc::new(InMemoryQrService::new().with_image("abc123", PNG.to_vec()));
        let cache = AssetCache::new(service.clone(), false);

        let first = cache.resolve("abc123").await.unwrap();
        let second = cache.resolve("abc123").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(service.image_calls("abc123"), 1);
        assert_eq!(cache.fetch_count(), 1);
        assert!(first.detail.is_none());
    }

    #[tokio::test]
    async fn test_status_follows_resolution() {
        let service = Arc::new(InMemoryQrService::new().with_image("abc123", PNG.to_vec()));
        let cache = AssetCache::new(service, false);
        assert_eq!(cache.status(), AssetStatus::Idle);

        cache.resolve("abc123").await.unwrap();
        assert!(matches!(cache.status(), AssetStatus::Ready(_)));

        let err = cache.resolve("missing").await.unwrap_err();
        assert!(matches!(err, AssetError::FetchFailed { .. }));
        assert!(matches!(
            cache.status(),
            AssetStatus::Unavailable(AssetError::FetchFailed { .. })
        ));
        assert!(cache.current().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried() {
        let service = Arc::new(InMemoryQrService::new());
        let cache = AssetCache::new(service.clone(), false);

        assert!(cache.resolve("abc123").await.is_err());
        service.insert_image("abc123", PNG.to_vec());
        assert!(cache.resolve("abc123").await.is_ok());
        assert_eq!(service.image_calls("abc123"), 2);
    }

    #[tokio::test]
    async fn test_download_requires_resolved_image() {
        let service = Arc::new(InMemoryQrService::new().with_image("abc123", PNG.to_vec()));
        let cache = AssetCache::new(service, false);
        let record = ProductRecord {
            lot_code: Some("L1".to_string()),
            qr_hash: Some("abc123".to_string()),
            ..ProductRecord::default()
        };
        let config = ViewerConfig::default();

        assert_eq!(cache.download(&record, &config), Err(AssetError::Unavailable));

        cache.resolve("abc123").await.unwrap();
        let file = cache.download(&record, &config).unwrap();
        assert_eq!(file.file_name, "QR_L1_producto.png");
        assert_eq!(file.mime, "image/png");
        assert_eq!(&*file.bytes, PNG);

        let other = ProductRecord {
            qr_hash: Some("zzz".to_string()),
            ..record
        };
        assert_eq!(cache.download(&other, &config), Err(AssetError::Unavailable));
    }

    #[tokio::test]
    async fn test_clear_evicts() {
        let service = Arc::new(InMemoryQrService::new().with_image("abc123", PNG.to_vec()));
        let cache = AssetCache::new(service.clone(), false);
        cache.resolve("abc123").await.unwrap();

        cache.clear();

        assert_eq!(cache.status(), AssetStatus::Idle);
        assert!(cache.current_hash().is_none());
        cache.resolve("abc123").await.unwrap();
        assert_eq!(service.image_calls("abc123"), 2);
    }
}
