//! # jurat-intake
//!
//! Getting client data in: assistant capture, shareable drafts completed by
//! the client, and bulk JSON import. Everything is stored through the
//! [`ClientStore`] port.
//!
//! ## Example
//!
//! ```
//! use jurat_core::IntakeSource;
//! use jurat_intake::{import_completed_drafts, sample_client, save_client, submit_draft};
//! use jurat_intake::{send_draft, ClientStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! let client = save_client(&mut store, sample_client(), IntakeSource::Assistant).unwrap();
//! assert_eq!(client.full_name.as_deref(), Some("Valeria Isabel Gomez"));
//!
//! let draft = send_draft(&mut store, "N-400").unwrap();
//! submit_draft(&mut store, &draft.id, sample_client()).unwrap();
//! let imported = import_completed_drafts(&mut store).unwrap();
//! assert_eq!(imported.len(), 1);
//! assert_eq!(store.load_clients().unwrap().len(), 2);
//! ```

pub mod capture;
pub mod draft;
pub mod error;
pub mod import;
pub mod sample;
pub mod store;

pub use capture::{capture, capture_at, client_id_at, draft_id_at, save_client, timestamp};
pub use draft::{
    import_completed_drafts, import_completed_drafts_at, open_draft, send_draft, submit_draft,
    Draft, DraftStatus,
};
pub use error::{IntakeError, Result};
pub use import::{import_clients, parse_client_batch};
pub use sample::sample_client;
pub use store::{
    add_client, find_client, ClientStore, JsonFileStore, MemoryStore, CLIENTS_FILE, DRAFTS_FILE,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
