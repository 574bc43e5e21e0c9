//! # jurat-pdf
//!
//! PDF work for jurat, built on [`lopdf`]:
//!
//! - [`acroform`]: enumerate and fill AcroForm text fields, regenerate their
//!   appearance streams, strip XFA
//! - [`mapping`]: ordered binding rules from canonical record keys to the
//!   fields of the official N-400 template
//! - [`placeholder`]: label/value summary pages for forms without a template
//! - [`merge`]: concatenate documents into one packet
//!
//! ## Example
//!
//! ```
//! use jurat_core::{normalize, RawClientRecord};
//! use jurat_pdf::{fill, test_utils::n400_template, PdfForm};
//!
//! let record = normalize(&RawClientRecord {
//!     full_name: Some("Valeria Isabel Gomez".to_string()),
//!     ..Default::default()
//! });
//!
//! let filled = fill(&record, &n400_template())?;
//! let form = PdfForm::load(&filled.bytes)?;
//! assert_eq!(
//!     form.text_value("form1[0].#subform[1].Part2Line4a_GivenName[0]").as_deref(),
//!     Some("VALERIA")
//! );
//! # Ok::<(), jurat_pdf::PdfError>(())
//! ```

pub mod acroform;
pub mod error;
pub mod mapping;
pub mod merge;
pub mod placeholder;
pub mod test_utils;

pub use acroform::{FieldKind, FormField, PdfForm};
pub use error::{PdfError, Result};
pub use mapping::{
    field_map_for, fill, fill_with, n400_field_map, BindingRule, FieldSelector, FillReport,
    FilledTemplate, TemplateFieldMap,
};
pub use merge::{merge_documents, page_count};
pub use placeholder::render_placeholder;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
