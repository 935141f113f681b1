//! QR asset retrieval: decoding, coalescing cache, viewer and downloads

pub mod cache;
pub mod download;
pub mod image;
pub mod viewer;

pub use cache::{AssetCache, AssetStatus, QrAsset};
pub use download::QrDownload;
pub use image::{DecodedImage, ImageFormat};
pub use viewer::{QrDisplay, QrViewer};
