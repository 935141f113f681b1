//! Collaborator implementations that keep their state in memory

pub mod in_memory;

pub use in_memory::{InMemoryProductService, InMemoryQrService, InMemoryReferenceService};
