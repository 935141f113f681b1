//! Product editor: reference catalog, draft store, confirmation handoff

pub mod catalog;
pub mod draft;
pub mod handoff;
pub mod session;

pub use catalog::{ReferenceCatalog, ReferenceCatalogLoader};
pub use draft::{DraftStore, SwitchTicket};
pub use handoff::{ConfirmationHandoff, HandoffState};
pub use session::{EditorServices, EditorSession};
