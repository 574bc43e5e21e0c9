//! # jurat-core
//!
//! Client record normalization and form schemas for jurat.
//!
//! Intake channels hand over records in whatever shape they collected them:
//! a structured name or a single free-text one, address parts or one
//! comma-separated line. This crate reconciles those variants into a single
//! canonical [`NormalizedClientRecord`] that every renderer consumes.
//!
//! ## Example
//!
//! ```
//! use jurat_core::{normalize, RawClientRecord};
//!
//! let raw = RawClientRecord {
//!     full_name: Some("Ana Maria Gutierrez".to_string()),
//!     address: Some("215 Grand Ave, Los Angeles, CA 90012, United States".to_string()),
//!     ..Default::default()
//! };
//!
//! let record = normalize(&raw);
//! assert_eq!(record.first_name, "Ana");
//! assert_eq!(record.middle_name, "Maria");
//! assert_eq!(record.address_number, "215");
//! assert_eq!(record.state, "CA");
//! ```

pub mod address;
pub mod date;
pub mod name;
pub mod normalize;
pub mod record;
pub mod schema;

pub use address::{format_free_text, parse_free_text, split_street, AddressParts, StreetParts};
pub use date::format_date;
pub use name::{join_name, split_name, NameParts};
pub use normalize::normalize;
pub use record::{AddressInput, IntakeSource, NameInput, NormalizedClientRecord, RawClientRecord};
pub use schema::{
    find_form, get_schema, list_forms, preview, FieldDescriptor, FormDescriptor, PreviewRow,
    N400_FORM_ID,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
