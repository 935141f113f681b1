//! Decoding of raw QR image bytes into something a view can display

use crate::core::error::AssetError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;

/// Raster or vector format recognized from the leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Svg,
}

impl ImageFormat {
    /// Recognize the format from the file signature
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

        if bytes.starts_with(PNG) {
            return Some(ImageFormat::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }

        let head = &bytes[..bytes.len().min(256)];
        let text = String::from_utf8_lossy(head);
        let text = text.trim_start();
        if text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg")) {
            return Some(ImageFormat::Svg);
        }
        None
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Svg => "svg",
        }
    }
}

/// A QR image ready for display and download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    format: ImageFormat,
    bytes: Arc<[u8]>,
    data_url: String,
}

impl DecodedImage {
    /// Check the bytes and build the `data:` URL used by image views
    pub fn decode(hash: &str, bytes: Vec<u8>) -> Result<Self, AssetError> {
        if bytes.is_empty() {
            return Err(AssetError::Undecodable {
                hash: hash.to_string(),
                message: "empty response".to_string(),
            });
        }
        let format = ImageFormat::sniff(&bytes).ok_or_else(|| AssetError::Undecodable {
            hash: hash.to_string(),
            message: "unrecognized image signature".to_string(),
        })?;

        let data_url = format!("data:{};base64,{}", format.mime(), STANDARD.encode(&bytes));

        Ok(Self {
            format,
            bytes: bytes.into(),
            data_url,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// The raw image bytes, shared with every holder of this image
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(PNG_BYTES), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(
            ImageFormat::sniff(b"  <?xml version=\"1.0\"?><svg xmlns=\"x\"></svg>"),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::sniff(b"{\"error\":\"not found\"}"), None);
    }

    #[test]
    fn test_decode_builds_data_url() {
        let image = DecodedImage::decode("abc", PNG_BYTES.to_vec()).unwrap();

        assert_eq!(image.mime(), "image/png");
        assert_eq!(image.len(), PNG_BYTES.len());
        assert!(image.data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(&*image.bytes(), PNG_BYTES);
    }

    #[test]
    fn test_decode_rejects_empty_and_unknown() {
        let err = DecodedImage::decode("abc", Vec::new()).unwrap_err();
        assert!(matches!(err, AssetError::Undecodable { .. }));

        let err = DecodedImage::decode("abc", b"<html>".to_vec()).unwrap_err();
        assert!(matches!(err, AssetError::Undecodable { ref hash, .. } if hash == "abc"));
    }
}
