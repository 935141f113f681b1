//! Serde helpers for loosely typed backend records
//!
//! The product backend sends ids and quantities either as JSON strings or as
//! numbers depending on the endpoint. The editor holds them as text.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional string-or-number into `Option<String>`
///
/// `null` and empty strings become `None`. Use together with `#[serde(default)]`.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// Deserialize a required string-or-number into `String`
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_text(deserializer)?.ok_or_else(|| de::Error::custom("expected a non-empty value"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "opt_text")]
        value: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Strict {
        #[serde(deserialize_with = "text")]
        id: String,
    }

    #[test]
    fn test_number_becomes_text() {
        let holder: Holder = serde_json::from_str(r#"{"value": 12}"#).unwrap();
        assert_eq!(holder.value.as_deref(), Some("12"));

        let holder: Holder = serde_json::from_str(r#"{"value": 2.5}"#).unwrap();
        assert_eq!(holder.value.as_deref(), Some("2.5"));
    }

    #[test]
    fn test_missing_null_and_empty_are_none() {
        let holder: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(holder.value.is_none());
        let holder: Holder = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert!(holder.value.is_none());
        let holder: Holder = serde_json::from_str(r#"{"value": ""}"#).unwrap();
        assert!(holder.value.is_none());
    }

    #[test]
    fn test_objects_are_rejected() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"value": {"a": 1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_required_text() {
        let strict: Strict = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(strict.id, "4");
        assert!(serde_json::from_str::<Strict>(r#"{"id": null}"#).is_err());
    }
}
