//! Service traits for the collaborators the editor consumes
//!
//! The editor core is agnostic to transport: implementations may call a REST
//! backend, a local database or, in tests, the in-memory services from
//! [`crate::storage`].

use crate::core::product::{DraftSnapshot, PersistedRecord, ProductRecord};
use crate::core::reference::{ReferenceKind, ReferenceOption};
use crate::core::serde_helpers::opt_text;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Source of the reference enumerations shown by the selection controls
#[async_trait]
pub trait ReferenceService: Send + Sync {
    /// Fetch every option of one enumeration
    async fn fetch_reference_enumeration(&self, kind: ReferenceKind)
    -> Result<Vec<ReferenceOption>>;
}

/// Source of QR images and the records behind them
#[async_trait]
pub trait QrService: Send + Sync {
    /// Fetch the raster bytes of the QR image for a content hash
    async fn fetch_qr_image(&self, hash: &str) -> Result<Vec<u8>>;

    /// Fetch the full product record a QR hash points to
    async fn fetch_product_by_hash(&self, hash: &str) -> Result<QrDetail>;
}

/// Persistence of confirmed products
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Create or update the product described by the snapshot
    ///
    /// Implementations look at [`DraftSnapshot::mode`] to choose between create
    /// and update.
    async fn submit_product(&self, snapshot: &DraftSnapshot) -> Result<PersistedRecord>;
}

/// Detail record returned by a lookup by QR hash
///
/// It is a product record with the extra fields only the detail endpoint
/// provides. The detail endpoint prefers its own spellings: `fechaIngreso`
/// over `fecha`, `fechaCaducidad` over `caducidad` and `muestreo` over
/// `fechaMuestreo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "QrDetailWire")]
pub struct QrDetail {
    #[serde(flatten)]
    pub record: ProductRecord,
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "reanalisis", skip_serializing_if = "Option::is_none")]
    pub reanalysis_date: Option<String>,
    #[serde(rename = "muestreo", skip_serializing_if = "Option::is_none")]
    pub sampling_date: Option<String>,
}

#[derive(Deserialize)]
struct QrDetailWire {
    #[serde(flatten)]
    record: ProductRecord,
    #[serde(default, deserialize_with = "opt_text")]
    nombre: Option<String>,
    #[serde(rename = "createdAt", default, deserialize_with = "opt_text")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    reanalisis: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    muestreo: Option<String>,
    #[serde(rename = "fechaMuestreo", default, deserialize_with = "opt_text")]
    fecha_muestreo: Option<String>,
    #[serde(rename = "fechaIngreso", default, deserialize_with = "opt_text")]
    fecha_ingreso: Option<String>,
    #[serde(rename = "fechaCaducidad", default, deserialize_with = "opt_text")]
    fecha_caducidad: Option<String>,
}

impl From<QrDetailWire> for QrDetail {
    fn from(wire: QrDetailWire) -> Self {
        let mut record = wire.record;
        record.intake_date = wire.fecha_ingreso.or(record.intake_date);
        record.expiry_date = wire.fecha_caducidad.or(record.expiry_date);

        Self {
            record,
            name: wire.nombre,
            created_at: wire.created_at,
            reanalysis_date: wire.reanalisis,
            sampling_date: wire.muestreo.or(wire.fecha_muestreo),
        }
    }
}
