//! Integration tests for loading the editor configuration from disk

use inventory_editor::prelude::*;
use std::io::Write;
use std::sync::Arc;

#[test]
fn test_load_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
validation:
  date_format: "%d/%m/%Y"
  max_text_length: 12
viewer:
  fetch_detail: false
  download_prefix: etiqueta
"#
    )
    .unwrap();

    let config = EditorConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.validation.date_format, "%d/%m/%Y");
    assert_eq!(config.validation.max_text_length, 12);
    assert!(!config.viewer.fetch_detail);
    assert_eq!(config.viewer.download_prefix, "etiqueta");
    assert_eq!(config.viewer.download_suffix, "producto");
}

#[test]
fn test_empty_sections_give_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "validation: {{}}\nviewer: {{}}").unwrap();

    let config = EditorConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config, EditorConfig::default_config());
}

#[test]
fn test_text_limit_feeds_the_engine() {
    let config = EditorConfig::from_yaml_str("validation:\n  max_text_length: 3\n").unwrap();
    let engine = ValidationEngine::from_config(&config.validation);

    assert!(engine.validate_field(ProductField::LotCode, "L12").is_empty());
    assert_eq!(engine.validate_field(ProductField::LotCode, "L123").len(), 1);
}

#[tokio::test]
async fn test_date_format_reaches_submission() {
    let config = EditorConfig::from_yaml_str("validation:\n  date_format: \"%d/%m/%Y\"\n").unwrap();
    let services = EditorServices::new(
        Arc::new(InMemoryReferenceService::new()),
        Arc::new(InMemoryProductService::new()),
    );
    let mut session = EditorSession::open(&services, &config, None, EditMode::Create).await;

    for (field, value) in [
        (ProductField::CatalogId, "1"),
        (ProductField::StatusId, "2"),
        (ProductField::UnitId, "3"),
        (ProductField::WarehouseTypeId, "4"),
        (ProductField::LotCode, "L1"),
        (ProductField::SupplierLotCode, "P1"),
        (ProductField::IntakeDate, "01/01/2024"),
        (ProductField::ExpiryDate, "31/12/2024"),
        (ProductField::Amount, "5"),
        (ProductField::TotalAmount, "10"),
        (ProductField::ContainerCount, "2"),
    ] {
        assert!(session.apply_change(field, value).unwrap().is_empty());
    }

    let snapshot = session.submit().unwrap();
    assert_eq!(snapshot.get(ProductField::IntakeDate), "01/01/2024");
}
