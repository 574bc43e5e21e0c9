//! # jurat-render
//!
//! Turns client records into finished form PDFs.
//!
//! ## Strategies
//!
//! - [`LocalRenderer`]: fills the official N-400 template in-process and
//!   lays out placeholder pages for every other form (feature `local`)
//! - [`RemoteRenderer`]: posts the normalized record to a rendering service
//!   (feature `remote`)
//!
//! [`select_renderer`] picks one from [`Settings`]. [`PacketAssembler`]
//! renders several forms and merges them into one document.
//!
//! ## Example
//!
//! ```no_run
//! use jurat_core::RawClientRecord;
//! use jurat_render::{select_renderer, template_loader, PacketAssembler, Settings};
//!
//! # async fn run() -> jurat_render::RenderResult<()> {
//! let settings = Settings::default();
//! let renderer = select_renderer(&settings, template_loader(&settings)?)?;
//!
//! let record = RawClientRecord {
//!     full_name: Some("Valeria Isabel Gomez".to_string()),
//!     ..Default::default()
//! };
//! let n400 = renderer.render(&record, "N-400").await?;
//! let packet = PacketAssembler::new(renderer.as_ref())
//!     .assemble(&["N-400", "I-130"], &record)
//!     .await?;
//! # let _ = (n400, packet);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod local;
pub mod packet;
pub mod remote;
pub mod renderer;

pub use config::{RemoteSettings, RenderSettings, Settings};
pub use engine::{
    select_renderer, select_renderer_with_transport, template_loader, RenderStrategy,
};
pub use error::{RenderError, RenderResult};
#[cfg(feature = "remote")]
pub use loader::HttpTemplateLoader;
pub use loader::{DirTemplateLoader, MemoryTemplateLoader, TemplateLoader};
pub use local::LocalRenderer;
pub use packet::{PacketAssembler, RenderedPacket, PACKET_FILE_NAME};
#[cfg(feature = "remote")]
pub use remote::ReqwestTransport;
pub use remote::{FillTransport, RemoteRenderer, TransportResponse};
pub use renderer::{
    canonical_form_id, content_hash, output_file_name, DocumentRenderer, RenderedDocument,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
