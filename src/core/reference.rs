//! Reference enumerations offered by the selection controls

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four independent option enumerations of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Catalog,
    Status,
    Unit,
    WarehouseType,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Catalog,
        ReferenceKind::Status,
        ReferenceKind::Unit,
        ReferenceKind::WarehouseType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Catalog => "catalog",
            ReferenceKind::Status => "status",
            ReferenceKind::Unit => "unit",
            ReferenceKind::WarehouseType => "warehouse type",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceOption {
    #[serde(deserialize_with = "crate::core::serde_helpers::text")]
    pub id: String,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ReferenceOption {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_accepts_name_alias() {
        let option: ReferenceOption =
            serde_json::from_str(r#"{"id":"7","name":"Kilogram","code":"KG"}"#).unwrap();
        assert_eq!(option, ReferenceOption::new("7", "Kilogram").with_code("KG"));
    }

    #[test]
    fn test_option_without_code() {
        let option: ReferenceOption =
            serde_json::from_str(r#"{"id":"1","displayName":"Reagents"}"#).unwrap();
        assert!(option.code.is_none());
        let json = serde_json::to_value(&option).unwrap();
        assert!(json.get("code").is_none());
    }
}
