//! Parallel loading of the reference enumerations

use crate::core::error::ReferenceLoadError;
use crate::core::reference::{ReferenceKind, ReferenceOption};
use crate::core::service::ReferenceService;
use std::sync::Arc;

/// Read-only option lists of one editing session
///
/// A list whose fetch failed is empty and its kind is listed in
/// [`failures`](Self::failures); the matching selection control is disabled
/// while the rest of the editor keeps working.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    catalogs: Vec<ReferenceOption>,
    statuses: Vec<ReferenceOption>,
    units: Vec<ReferenceOption>,
    warehouse_types: Vec<ReferenceOption>,
    failures: Vec<ReferenceLoadError>,
}

impl ReferenceCatalog {
    /// Options of one enumeration
    pub fn options(&self, kind: ReferenceKind) -> &[ReferenceOption] {
        match kind {
            ReferenceKind::Catalog => &self.catalogs,
            ReferenceKind::Status => &self.statuses,
            ReferenceKind::Unit => &self.units,
            ReferenceKind::WarehouseType => &self.warehouse_types,
        }
    }

    /// Whether the enumeration loaded and can be offered
    pub fn is_available(&self, kind: ReferenceKind) -> bool {
        !self.failures.iter().any(|failure| failure.kind == kind)
    }

    /// Look up the option a stored id points to
    pub fn find(&self, kind: ReferenceKind, id: &str) -> Option<&ReferenceOption> {
        self.options(kind).iter().find(|option| option.id == id)
    }

    /// Enumerations that could not be loaded
    pub fn failures(&self) -> &[ReferenceLoadError] {
        &self.failures
    }

    fn assign(&mut self, kind: ReferenceKind, result: Result<Vec<ReferenceOption>, ReferenceLoadError>) {
        let options = match result {
            Ok(options) => options,
            Err(err) => {
                self.failures.push(err);
                Vec::new()
            }
        };
        match kind {
            ReferenceKind::Catalog => self.catalogs = options,
            ReferenceKind::Status => self.statuses = options,
            ReferenceKind::Unit => self.units = options,
            ReferenceKind::WarehouseType => self.warehouse_types = options,
        }
    }
}

/// Fetches the four reference enumerations once per editing session
#[derive(Clone)]
pub struct ReferenceCatalogLoader {
    service: Arc<dyn ReferenceService>,
}

impl ReferenceCatalogLoader {
    pub fn new(service: Arc<dyn ReferenceService>) -> Self {
        Self { service }
    }

    /// Issue the four fetches concurrently and collect what arrives
    ///
    /// Never fails: each failed enumeration degrades to an empty list.
    pub async fn load(&self) -> ReferenceCatalog {
        let (catalogs, statuses, units, warehouse_types) = futures::join!(
            self.fetch(ReferenceKind::Catalog),
            self.fetch(ReferenceKind::Status),
            self.fetch(ReferenceKind::Unit),
            self.fetch(ReferenceKind::WarehouseType),
        );

        let mut catalog = ReferenceCatalog::default();
        catalog.assign(ReferenceKind::Catalog, catalogs);
        catalog.assign(ReferenceKind::Status, statuses);
        catalog.assign(ReferenceKind::Unit, units);
        catalog.assign(ReferenceKind::WarehouseType, warehouse_types);

        tracing::debug!(
            catalogs = catalog.catalogs.len(),
            statuses = catalog.statuses.len(),
            units = catalog.units.len(),
            warehouse_types = catalog.warehouse_types.len(),
            failures = catalog.failures.len(),
            "Reference catalog loaded"
        );

        catalog
    }

    async fn fetch(&self, kind: ReferenceKind) -> Result<Vec<ReferenceOption>, ReferenceLoadError> {
        self.service
            .fetch_reference_enumeration(kind)
            .await
            .map_err(|e| {
                tracing::warn!(kind = %kind, error = %e, "Reference enumeration unavailable");
                ReferenceLoadError {
                    kind,
                    message: e.to_string(),
                }
            })
    }
}
