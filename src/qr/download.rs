//! Deterministic download names for QR images

use crate::config::ViewerConfig;
use crate::core::product::ProductRecord;
use crate::qr::image::ImageFormat;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// A QR image ready to be saved locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrDownload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Arc<[u8]>,
}

/// Build `{prefix}_{lot}_{suffix}.{ext}` for a record
///
/// The lot code is the stable part of the name; records without one fall back
/// to their id and then to their QR hash. Characters that are not safe in file
/// names are replaced with `_`.
pub fn file_name(config: &ViewerConfig, record: &ProductRecord, format: ImageFormat) -> String {
    let stem = usable(&record.lot_code)
        .or_else(|| usable(&record.id))
        .or_else(|| usable(&record.qr_hash))
        .unwrap_or("unknown");

    let parts: Vec<String> = [config.download_prefix.as_str(), stem, config.download_suffix.as_str()]
        .into_iter()
        .map(sanitize)
        .filter(|part| !part.is_empty())
        .collect();

    format!("{}.{}", parts.join("_"), format.extension())
}

fn usable(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn sanitize(segment: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let regex = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());
    regex
        .replace_all(segment.trim(), "_")
        .trim_matches('_')
        .to_string()
}
