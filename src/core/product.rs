//! Product records, drafts and frozen snapshots
//!
//! A [`ProductRecord`] is what the backend persists. A [`ProductDraft`] is the
//! text-only working copy the operator edits. A [`DraftSnapshot`] is the
//! immutable copy handed to the review step, and [`ProductPayload`] is its typed
//! form at the persistence boundary.

use crate::core::error::ValidationError;
use crate::core::field::ProductField;
use crate::core::serde_helpers::opt_text;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use validator::Validate;

/// Default calendar date format of the product forms
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// How the editor was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Create,
    Update,
    View,
}

impl EditMode {
    /// Whether field changes and submission are allowed
    pub fn is_editable(&self) -> bool {
        !matches!(self, EditMode::View)
    }

    /// Name of the persistence operation this mode performs
    pub fn operation(&self) -> &'static str {
        match self {
            EditMode::Create => "create",
            EditMode::Update => "update",
            EditMode::View => "view",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// A persisted product as returned by the backend
///
/// List and detail endpoints spell three fields differently (`fecha` or
/// `fechaIngreso`, `caducidad` or `fechaCaducidad`, `cantidadSobrante` or
/// `cantidad`). Both spellings are accepted, together or alone; the list
/// spelling wins when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductRecordWire")]
pub struct ProductRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "stockCatalogueId")]
    pub catalog_id: Option<String>,
    #[serde(rename = "productStatusId")]
    pub status_id: Option<String>,
    #[serde(rename = "unitOfMeasurementId")]
    pub unit_id: Option<String>,
    #[serde(rename = "warehouseTypeId")]
    pub warehouse_type_id: Option<String>,
    #[serde(rename = "lote")]
    pub lot_code: Option<String>,
    #[serde(rename = "loteProveedor")]
    pub supplier_lot_code: Option<String>,
    #[serde(rename = "numeroSerie")]
    pub serial_number: Option<String>,
    #[serde(rename = "fabricante")]
    pub manufacturer: Option<String>,
    #[serde(rename = "distribuidor")]
    pub distributor: Option<String>,
    #[serde(rename = "fecha")]
    pub intake_date: Option<String>,
    #[serde(rename = "caducidad")]
    pub expiry_date: Option<String>,
    #[serde(rename = "cantidadSobrante")]
    pub amount: Option<String>,
    #[serde(rename = "cantidadTotal")]
    pub total_amount: Option<String>,
    #[serde(rename = "numeroContenedores")]
    pub container_count: Option<String>,
    #[serde(rename = "qrHash", skip_serializing_if = "Option::is_none")]
    pub qr_hash: Option<String>,
}

/// Wire shape of [`ProductRecord`] with every spelling in its own slot
#[derive(Deserialize)]
struct ProductRecordWire {
    #[serde(default, deserialize_with = "opt_text")]
    id: Option<String>,
    #[serde(rename = "stockCatalogueId", default, deserialize_with = "opt_text")]
    catalog_id: Option<String>,
    #[serde(rename = "productStatusId", default, deserialize_with = "opt_text")]
    status_id: Option<String>,
    #[serde(rename = "unitOfMeasurementId", default, deserialize_with = "opt_text")]
    unit_id: Option<String>,
    #[serde(rename = "warehouseTypeId", default, deserialize_with = "opt_text")]
    warehouse_type_id: Option<String>,
    #[serde(rename = "lote", default, deserialize_with = "opt_text")]
    lot_code: Option<String>,
    #[serde(rename = "loteProveedor", default, deserialize_with = "opt_text")]
    supplier_lot_code: Option<String>,
    #[serde(rename = "numeroSerie", default, deserialize_with = "opt_text")]
    serial_number: Option<String>,
    #[serde(rename = "fabricante", default, deserialize_with = "opt_text")]
    manufacturer: Option<String>,
    #[serde(rename = "distribuidor", default, deserialize_with = "opt_text")]
    distributor: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    fecha: Option<String>,
    #[serde(rename = "fechaIngreso", default, deserialize_with = "opt_text")]
    fecha_ingreso: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    caducidad: Option<String>,
    #[serde(rename = "fechaCaducidad", default, deserialize_with = "opt_text")]
    fecha_caducidad: Option<String>,
    #[serde(rename = "cantidadSobrante", default, deserialize_with = "opt_text")]
    cantidad_sobrante: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    cantidad: Option<String>,
    #[serde(rename = "cantidadTotal", default, deserialize_with = "opt_text")]
    total_amount: Option<String>,
    #[serde(rename = "numeroContenedores", default, deserialize_with = "opt_text")]
    container_count: Option<String>,
    #[serde(rename = "qrHash", default, deserialize_with = "opt_text")]
    qr_hash: Option<String>,
}

impl From<ProductRecordWire> for ProductRecord {
    fn from(wire: ProductRecordWire) -> Self {
        Self {
            id: wire.id,
            catalog_id: wire.catalog_id,
            status_id: wire.status_id,
            unit_id: wire.unit_id,
            warehouse_type_id: wire.warehouse_type_id,
            lot_code: wire.lot_code,
            supplier_lot_code: wire.supplier_lot_code,
            serial_number: wire.serial_number,
            manufacturer: wire.manufacturer,
            distributor: wire.distributor,
            intake_date: wire.fecha.or(wire.fecha_ingreso),
            expiry_date: wire.caducidad.or(wire.fecha_caducidad),
            amount: wire.cantidad_sobrante.or(wire.cantidad),
            total_amount: wire.total_amount,
            container_count: wire.container_count,
            qr_hash: wire.qr_hash,
        }
    }
}

impl ProductRecord {
    /// Identity of the record, absent for records that were never persisted
    pub fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// The mutable, text-only working copy of a product
///
/// Quantities and dates stay text until submission so the operator can type
/// partial values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "stockCatalogueId", default)]
    pub catalog_id: String,
    #[serde(rename = "productStatusId", default)]
    pub status_id: String,
    #[serde(rename = "unitOfMeasurementId", default)]
    pub unit_id: String,
    #[serde(rename = "warehouseTypeId", default)]
    pub warehouse_type_id: String,
    #[serde(rename = "lote", default)]
    pub lot_code: String,
    #[serde(rename = "loteProveedor", default)]
    pub supplier_lot_code: String,
    #[serde(rename = "numeroSerie", default)]
    pub serial_number: String,
    #[serde(rename = "fabricante", default)]
    pub manufacturer: String,
    #[serde(rename = "distribuidor", default)]
    pub distributor: String,
    #[serde(rename = "fechaIngreso", default)]
    pub intake_date: String,
    #[serde(rename = "fechaCaducidad", default)]
    pub expiry_date: String,
    #[serde(rename = "cantidad", default)]
    pub amount: String,
    #[serde(rename = "cantidadTotal", default)]
    pub total_amount: String,
    #[serde(rename = "numeroContenedores", default)]
    pub container_count: String,
}

impl ProductDraft {
    /// Field-mapped copy of a persisted record, dates in [`DEFAULT_DATE_FORMAT`]
    pub fn from_record(record: &ProductRecord) -> Self {
        Self::from_record_with_format(record, DEFAULT_DATE_FORMAT)
    }

    /// Field-mapped copy of a persisted record, dates rendered in `date_format`
    pub fn from_record_with_format(record: &ProductRecord, date_format: &str) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let date = |value: &Option<String>| {
            value
                .as_deref()
                .map(|value| normalize_date(value, date_format))
                .unwrap_or_default()
        };

        Self {
            id: record.id.clone(),
            catalog_id: text(&record.catalog_id),
            status_id: text(&record.status_id),
            unit_id: text(&record.unit_id),
            warehouse_type_id: text(&record.warehouse_type_id),
            lot_code: text(&record.lot_code),
            supplier_lot_code: text(&record.supplier_lot_code),
            serial_number: text(&record.serial_number),
            manufacturer: text(&record.manufacturer),
            distributor: text(&record.distributor),
            intake_date: date(&record.intake_date),
            expiry_date: date(&record.expiry_date),
            amount: text(&record.amount),
            total_amount: text(&record.total_amount),
            container_count: text(&record.container_count),
        }
    }

    /// Current text of a field
    pub fn get(&self, field: ProductField) -> &str {
        match field {
            ProductField::CatalogId => &self.catalog_id,
            ProductField::StatusId => &self.status_id,
            ProductField::UnitId => &self.unit_id,
            ProductField::WarehouseTypeId => &self.warehouse_type_id,
            ProductField::LotCode => &self.lot_code,
            ProductField::SupplierLotCode => &self.supplier_lot_code,
            ProductField::SerialNumber => &self.serial_number,
            ProductField::Manufacturer => &self.manufacturer,
            ProductField::Distributor => &self.distributor,
            ProductField::IntakeDate => &self.intake_date,
            ProductField::ExpiryDate => &self.expiry_date,
            ProductField::Amount => &self.amount,
            ProductField::TotalAmount => &self.total_amount,
            ProductField::ContainerCount => &self.container_count,
        }
    }

    /// Replace the text of a field
    pub fn set(&mut self, field: ProductField, value: impl Into<String>) {
        let slot = match field {
            ProductField::CatalogId => &mut self.catalog_id,
            ProductField::StatusId => &mut self.status_id,
            ProductField::UnitId => &mut self.unit_id,
            ProductField::WarehouseTypeId => &mut self.warehouse_type_id,
            ProductField::LotCode => &mut self.lot_code,
            ProductField::SupplierLotCode => &mut self.supplier_lot_code,
            ProductField::SerialNumber => &mut self.serial_number,
            ProductField::Manufacturer => &mut self.manufacturer,
            ProductField::Distributor => &mut self.distributor,
            ProductField::IntakeDate => &mut self.intake_date,
            ProductField::ExpiryDate => &mut self.expiry_date,
            ProductField::Amount => &mut self.amount,
            ProductField::TotalAmount => &mut self.total_amount,
            ProductField::ContainerCount => &mut self.container_count,
        };
        *slot = value.into();
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, field: ProductField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Whether every required field holds non-blank text
    pub fn required_fields_filled(&self) -> bool {
        ProductField::required().all(|field| !self.get(field).trim().is_empty())
    }
}

/// Reduce a backend date or date-time to its calendar date in `format`
///
/// Backend values are ISO dates or RFC 3339 date-times. Values that are not
/// recognizable dates are kept as typed so the validator can report them.
pub fn normalize_date(value: &str, format: &str) -> String {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, DEFAULT_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
        .or_else(|| {
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, DEFAULT_DATE_FORMAT).ok())
        })
        .or_else(|| NaiveDate::parse_from_str(value, format).ok());

    let Some(date) = date else {
        return value.to_string();
    };
    let mut rendered = String::new();
    match write!(rendered, "{}", date.format(format)) {
        Ok(()) => rendered,
        Err(_) => value.to_string(),
    }
}

/// Immutable copy of a draft taken when submission passed validation
///
/// The snapshot owns its own copy of the draft, so later edits of the live
/// draft can never leak into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSnapshot {
    mode: EditMode,
    draft: ProductDraft,
    taken_at: DateTime<Utc>,
}

impl DraftSnapshot {
    pub fn new(mode: EditMode, draft: &ProductDraft) -> Self {
        Self {
            mode,
            draft: draft.clone(),
            taken_at: Utc::now(),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn get(&self, field: ProductField) -> &str {
        self.draft.get(field)
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Convert the frozen text into the typed persistence payload
    ///
    /// Quantities and dates are parsed here, then the payload is checked with
    /// its `validator` rules.
    pub fn to_payload(&self, date_format: &str) -> Result<ProductPayload, ValidationError> {
        let d = &self.draft;
        let payload = ProductPayload {
            id: match self.mode {
                EditMode::Create => None,
                _ => d.id.clone(),
            },
            catalog_id: d.catalog_id.trim().to_string(),
            status_id: d.status_id.trim().to_string(),
            unit_id: d.unit_id.trim().to_string(),
            warehouse_type_id: d.warehouse_type_id.trim().to_string(),
            lot_code: d.lot_code.trim().to_string(),
            supplier_lot_code: d.supplier_lot_code.trim().to_string(),
            serial_number: non_blank(&d.serial_number),
            manufacturer: non_blank(&d.manufacturer),
            distributor: non_blank(&d.distributor),
            intake_date: parse_date(ProductField::IntakeDate, &d.intake_date, date_format)?,
            expiry_date: parse_date(ProductField::ExpiryDate, &d.expiry_date, date_format)?,
            amount: parse_number(ProductField::Amount, &d.amount)?,
            total_amount: parse_number(ProductField::TotalAmount, &d.total_amount)?,
            container_count: parse_count(&d.container_count).ok_or_else(|| {
                ValidationError::Payload {
                    field: ProductField::ContainerCount.as_str().to_string(),
                    message: format!("'{}' is not a container count", d.container_count),
                }
            })?,
        };

        payload.validate().map_err(|errors| {
            let field = errors
                .field_errors()
                .keys()
                .next()
                .map(|key| payload_wire_name(key).to_string())
                .unwrap_or_default();
            ValidationError::Payload {
                field,
                message: errors.to_string(),
            }
        })?;

        Ok(payload)
    }
}

/// Wire name of a [`ProductPayload`] field as reported by `validator`
fn payload_wire_name(rust_field: &str) -> &str {
    match rust_field {
        "catalog_id" => ProductField::CatalogId.as_str(),
        "status_id" => ProductField::StatusId.as_str(),
        "unit_id" => ProductField::UnitId.as_str(),
        "warehouse_type_id" => ProductField::WarehouseTypeId.as_str(),
        "lot_code" => ProductField::LotCode.as_str(),
        "supplier_lot_code" => ProductField::SupplierLotCode.as_str(),
        "amount" => ProductField::Amount.as_str(),
        "total_amount" => ProductField::TotalAmount.as_str(),
        other => other,
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_date(field: ProductField, value: &str, format: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| ValidationError::Payload {
        field: field.as_str().to_string(),
        message: format!("'{}' does not match {}", value, format),
    })
}

/// Container counts accept the same text as the `count` validator
fn parse_count(value: &str) -> Option<u32> {
    let value = value.trim().parse::<i64>().ok()?;
    u32::try_from(value).ok()
}

fn parse_number(field: ProductField, value: &str) -> Result<f64, ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::Payload {
            field: field.as_str().to_string(),
            message: format!("'{}' is not a number", value),
        })
}

/// Typed product as handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct ProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "stockCatalogueId")]
    #[validate(length(min = 1))]
    pub catalog_id: String,
    #[serde(rename = "productStatusId")]
    #[validate(length(min = 1))]
    pub status_id: String,
    #[serde(rename = "unitOfMeasurementId")]
    #[validate(length(min = 1))]
    pub unit_id: String,
    #[serde(rename = "warehouseTypeId")]
    #[validate(length(min = 1))]
    pub warehouse_type_id: String,
    #[serde(rename = "lote")]
    #[validate(length(min = 1))]
    pub lot_code: String,
    #[serde(rename = "loteProveedor")]
    #[validate(length(min = 1))]
    pub supplier_lot_code: String,
    #[serde(rename = "numeroSerie")]
    pub serial_number: Option<String>,
    #[serde(rename = "fabricante")]
    pub manufacturer: Option<String>,
    #[serde(rename = "distribuidor")]
    pub distributor: Option<String>,
    #[serde(rename = "fechaIngreso")]
    pub intake_date: NaiveDate,
    #[serde(rename = "fechaCaducidad")]
    pub expiry_date: NaiveDate,
    #[serde(rename = "cantidad")]
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[serde(rename = "cantidadTotal")]
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
    #[serde(rename = "numeroContenedores")]
    pub container_count: u32,
}

/// What the persistence collaborator returns on success
pub type PersistedRecord = ProductRecord;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_draft() -> ProductDraft {
        ProductDraft::default()
            .with(ProductField::CatalogId, "1")
            .with(ProductField::StatusId, "2")
            .with(ProductField::UnitId, "3")
            .with(ProductField::WarehouseTypeId, "4")
            .with(ProductField::LotCode, "L1")
            .with(ProductField::SupplierLotCode, "P1")
            .with(ProductField::IntakeDate, "2024-01-01")
            .with(ProductField::ExpiryDate, "2024-12-31")
            .with(ProductField::Amount, "5")
            .with(ProductField::TotalAmount, "10")
            .with(ProductField::ContainerCount, "2")
    }

    #[test]
    fn test_record_maps_fallback_names() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": 42,
            "stockCatalogueId": 1,
            "productStatusId": "2",
            "lote": "L-9",
            "fecha": "2024-03-05T10:00:00Z",
            "caducidad": "2025-03-05",
            "cantidadSobrante": 7.5,
            "numeroContenedores": 3,
            "qrHash": "abc123"
        }))
        .unwrap();

        let draft = ProductDraft::from_record(&record);
        assert_eq!(draft.id.as_deref(), Some("42"));
        assert_eq!(draft.catalog_id, "1");
        assert_eq!(draft.status_id, "2");
        assert_eq!(draft.unit_id, "");
        assert_eq!(draft.lot_code, "L-9");
        assert_eq!(draft.intake_date, "2024-03-05");
        assert_eq!(draft.expiry_date, "2025-03-05");
        assert_eq!(draft.amount, "7.5");
        assert_eq!(draft.container_count, "3");
        assert_eq!(record.qr_hash.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_record_accepts_detail_spelling() {
        let record: ProductRecord = serde_json::from_value(json!({
            "fechaIngreso": "2024-01-01",
            "fechaCaducidad": "2024-06-01",
            "cantidad": "4"
        }))
        .unwrap();
        assert_eq!(record.intake_date.as_deref(), Some("2024-01-01"));
        assert_eq!(record.expiry_date.as_deref(), Some("2024-06-01"));
        assert_eq!(record.amount.as_deref(), Some("4"));
    }

    #[test]
    fn test_record_with_both_spellings() {
        let record: ProductRecord = serde_json::from_value(json!({
            "fecha": "2024-01-01",
            "fechaIngreso": "2024-02-02",
            "caducidad": "2025-01-01",
            "fechaCaducidad": "2025-02-02",
            "cantidadSobrante": 3,
            "cantidad": "9"
        }))
        .unwrap();

        assert_eq!(record.intake_date.as_deref(), Some("2024-01-01"));
        assert_eq!(record.expiry_date.as_deref(), Some("2025-01-01"));
        assert_eq!(record.amount.as_deref(), Some("3"));
    }

    #[test]
    fn test_record_serializes_list_spelling() {
        let record = ProductRecord {
            amount: Some("3".to_string()),
            ..ProductRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["cantidadSobrante"], "3");
        assert!(json.get("cantidad").is_none());
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-01-01", DEFAULT_DATE_FORMAT), "2024-01-01");
        assert_eq!(
            normalize_date("2024-01-01T23:30:00-05:00", DEFAULT_DATE_FORMAT),
            "2024-01-01"
        );
        assert_eq!(normalize_date("2024-01-01 08:00:00", DEFAULT_DATE_FORMAT), "2024-01-01");
        assert_eq!(normalize_date("soon", DEFAULT_DATE_FORMAT), "soon");
    }

    #[test]
    fn test_normalize_date_renders_configured_format() {
        assert_eq!(normalize_date("2024-01-31", "%d/%m/%Y"), "31/01/2024");
        assert_eq!(normalize_date("2024-01-31T10:00:00Z", "%d/%m/%Y"), "31/01/2024");
        assert_eq!(normalize_date("31/01/2024", "%d/%m/%Y"), "31/01/2024");
    }

    #[test]
    fn test_record_with_custom_date_format() {
        let record = ProductRecord {
            intake_date: Some("2024-03-05T10:00:00Z".to_string()),
            expiry_date: Some("2025-03-05".to_string()),
            ..ProductRecord::default()
        };
        let draft = ProductDraft::from_record_with_format(&record, "%d/%m/%Y");
        assert_eq!(draft.intake_date, "05/03/2024");
        assert_eq!(draft.expiry_date, "05/03/2025");
    }

    #[test]
    fn test_required_fields_filled() {
        assert!(valid_draft().required_fields_filled());
        assert!(!valid_draft().with(ProductField::LotCode, "  ").required_fields_filled());
        assert!(
            valid_draft()
                .with(ProductField::SerialNumber, "")
                .required_fields_filled()
        );
    }

    #[test]
    fn test_snapshot_is_isolated_from_draft() {
        let mut draft = valid_draft();
        let snapshot = DraftSnapshot::new(EditMode::Create, &draft);
        draft.set(ProductField::LotCode, "CHANGED");
        assert_eq!(snapshot.get(ProductField::LotCode), "L1");
    }

    #[test]
    fn test_payload_parses_typed_values() {
        let snapshot = DraftSnapshot::new(
            EditMode::Update,
            &valid_draft().with(ProductField::Manufacturer, "  "),
        );
        let payload = snapshot.to_payload(DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(payload.amount, 5.0);
        assert_eq!(payload.total_amount, 10.0);
        assert_eq!(payload.container_count, 2);
        assert_eq!(
            payload.expiry_date,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert!(payload.manufacturer.is_none());
    }

    #[test]
    fn test_create_payload_has_no_identity() {
        let mut draft = valid_draft();
        draft.id = Some("9".to_string());
        let payload = DraftSnapshot::new(EditMode::Create, &draft)
            .to_payload(DEFAULT_DATE_FORMAT)
            .unwrap();
        assert!(payload.id.is_none());

        let payload = DraftSnapshot::new(EditMode::Update, &draft)
            .to_payload(DEFAULT_DATE_FORMAT)
            .unwrap();
        assert_eq!(payload.id.as_deref(), Some("9"));
    }

    #[test]
    fn test_payload_rejects_negative_amount() {
        let snapshot =
            DraftSnapshot::new(EditMode::Create, &valid_draft().with(ProductField::Amount, "-1"));
        let err = snapshot.to_payload(DEFAULT_DATE_FORMAT).unwrap_err();
        assert!(matches!(err, ValidationError::Payload { field, .. } if field == "cantidad"));
    }

    #[test]
    fn test_payload_rejects_fractional_container_count() {
        let snapshot = DraftSnapshot::new(
            EditMode::Create,
            &valid_draft().with(ProductField::ContainerCount, "2.5"),
        );
        let err = snapshot.to_payload(DEFAULT_DATE_FORMAT).unwrap_err();
        assert!(
            matches!(err, ValidationError::Payload { field, .. } if field == "numeroContenedores")
        );
    }

    #[test]
    fn test_payload_serializes_wire_names() {
        let payload = DraftSnapshot::new(EditMode::Create, &valid_draft())
            .to_payload(DEFAULT_DATE_FORMAT)
            .unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["lote"], "L1");
        assert_eq!(json["fechaIngreso"], "2024-01-01");
        assert_eq!(json["numeroContenedores"], 2);
        assert!(json.get("id").is_none());
    }
}
