//! # Inventory Editor
//!
//! The core of an inventory product editor: a validated draft pipeline with a
//! two-phase confirmation handoff, and a coalescing cache for the QR image of
//! each product.
//!
//! ## Features
//!
//! - **Reference Catalog**: the four selection enumerations fetched in parallel, each degrading independently
//! - **Validation Engine**: per-field validator chains run on every change and again before submission
//! - **Draft Store**: a mutable working copy, re-initialized only when the source identity changes
//! - **Confirmation Handoff**: edit, review a frozen snapshot, then commit or go back
//! - **QR Asset Cache**: one in-flight fetch per hash, late results of superseded hashes discarded
//! - **Configuration-Based**: date format, text limits and download naming via YAML
//!
//! Transport is left to the caller: the editor talks to its collaborators
//! through the async traits in [`core::service`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use inventory_editor::prelude::*;
//!
//! let services = EditorServices::new(references, products);
//! let config = EditorConfig::default_config();
//!
//! let mut session = EditorSession::open(&services, &config, None, EditMode::Create).await;
//! session.apply_change(ProductField::LotCode, "L-2024-01")?;
//! // ...
//! if session.can_submit() {
//!     session.submit()?;
//!     let record = session.confirm().await?;
//!
//!     let viewer = QrViewer::new(qr_service, &config.viewer);
//!     viewer.open(record).await?;
//!     let file = viewer.download()?;
//! }
//! ```

pub mod config;
pub mod core;
pub mod editor;
pub mod qr;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{
            AssetError, CommitError, ConfigError, EditorError, EditorResult, ReferenceLoadError,
            SessionError, ValidationError,
        },
        field::{FieldKind, ProductField},
        product::{DraftSnapshot, EditMode, PersistedRecord, ProductDraft, ProductRecord},
        reference::{ReferenceKind, ReferenceOption},
        service::{ProductService, QrDetail, QrService, ReferenceService},
        validation::{ValidationEngine, ValidationErrorSet},
    };

    // === Editor ===
    pub use crate::editor::{
        ConfirmationHandoff, DraftStore, EditorServices, EditorSession, HandoffState,
        ReferenceCatalog, ReferenceCatalogLoader,
    };

    // === QR ===
    pub use crate::qr::{
        AssetCache, AssetStatus, DecodedImage, ImageFormat, QrAsset, QrDisplay, QrDownload,
        QrViewer,
    };

    // === Storage ===
    pub use crate::storage::{
        InMemoryProductService, InMemoryQrService, InMemoryReferenceService,
    };

    // === Config ===
    pub use crate::config::{EditorConfig, ValidationConfig, ViewerConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
