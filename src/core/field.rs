//! Product fields and their wire names

use crate::core::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every editable field of a product record
///
/// The serialized form is the camelCase wire name used by the persisted
/// record, e.g. `ProductField::LotCode` ⇄ `"lote"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductField {
    #[serde(rename = "stockCatalogueId")]
    CatalogId,
    #[serde(rename = "productStatusId")]
    StatusId,
    #[serde(rename = "unitOfMeasurementId")]
    UnitId,
    #[serde(rename = "warehouseTypeId")]
    WarehouseTypeId,
    #[serde(rename = "lote")]
    LotCode,
    #[serde(rename = "loteProveedor")]
    SupplierLotCode,
    #[serde(rename = "numeroSerie")]
    SerialNumber,
    #[serde(rename = "fabricante")]
    Manufacturer,
    #[serde(rename = "distribuidor")]
    Distributor,
    #[serde(rename = "fechaIngreso")]
    IntakeDate,
    #[serde(rename = "fechaCaducidad")]
    ExpiryDate,
    #[serde(rename = "cantidad")]
    Amount,
    #[serde(rename = "cantidadTotal")]
    TotalAmount,
    #[serde(rename = "numeroContenedores")]
    ContainerCount,
}

/// What kind of value a field holds while it is still text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Id of a reference option
    Selection,
    /// Free text
    Text,
    /// Calendar date
    Date,
    /// Decimal quantity
    Quantity,
    /// Whole-number count
    Count,
}

impl ProductField {
    /// All fields in form order
    pub const ALL: [ProductField; 14] = [
        ProductField::CatalogId,
        ProductField::StatusId,
        ProductField::UnitId,
        ProductField::WarehouseTypeId,
        ProductField::LotCode,
        ProductField::SupplierLotCode,
        ProductField::SerialNumber,
        ProductField::Manufacturer,
        ProductField::Distributor,
        ProductField::IntakeDate,
        ProductField::ExpiryDate,
        ProductField::Amount,
        ProductField::TotalAmount,
        ProductField::ContainerCount,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::CatalogId => "stockCatalogueId",
            ProductField::StatusId => "productStatusId",
            ProductField::UnitId => "unitOfMeasurementId",
            ProductField::WarehouseTypeId => "warehouseTypeId",
            ProductField::LotCode => "lote",
            ProductField::SupplierLotCode => "loteProveedor",
            ProductField::SerialNumber => "numeroSerie",
            ProductField::Manufacturer => "fabricante",
            ProductField::Distributor => "distribuidor",
            ProductField::IntakeDate => "fechaIngreso",
            ProductField::ExpiryDate => "fechaCaducidad",
            ProductField::Amount => "cantidad",
            ProductField::TotalAmount => "cantidadTotal",
            ProductField::ContainerCount => "numeroContenedores",
        }
    }

    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            ProductField::CatalogId => "Catalog",
            ProductField::StatusId => "Status",
            ProductField::UnitId => "Unit of measurement",
            ProductField::WarehouseTypeId => "Warehouse type",
            ProductField::LotCode => "Lot",
            ProductField::SupplierLotCode => "Supplier lot",
            ProductField::SerialNumber => "Serial number",
            ProductField::Manufacturer => "Manufacturer",
            ProductField::Distributor => "Distributor",
            ProductField::IntakeDate => "Intake date",
            ProductField::ExpiryDate => "Expiry date",
            ProductField::Amount => "Amount",
            ProductField::TotalAmount => "Total amount",
            ProductField::ContainerCount => "Number of containers",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ProductField::CatalogId
            | ProductField::StatusId
            | ProductField::UnitId
            | ProductField::WarehouseTypeId => FieldKind::Selection,
            ProductField::LotCode
            | ProductField::SupplierLotCode
            | ProductField::SerialNumber
            | ProductField::Manufacturer
            | ProductField::Distributor => FieldKind::Text,
            ProductField::IntakeDate | ProductField::ExpiryDate => FieldKind::Date,
            ProductField::Amount | ProductField::TotalAmount => FieldKind::Quantity,
            ProductField::ContainerCount => FieldKind::Count,
        }
    }

    /// Whether the field must be non-empty before submission
    pub fn is_required(&self) -> bool {
        !matches!(
            self,
            ProductField::SerialNumber | ProductField::Manufacturer | ProductField::Distributor
        )
    }

    /// Iterator over the required fields
    pub fn required() -> impl Iterator<Item = ProductField> {
        Self::ALL.into_iter().filter(ProductField::is_required)
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductField {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SessionError::UnknownField(s.to_string()))
    }
}
