//! jurat CLI - command-line interface library
//!
//! Commands:
//! - Forms / Preview / Normalize: inspect the catalog and client data
//! - Fill / Packet: render forms to PDF
//! - Import / Clients / Drafts / Sample: manage client intake
//!
//! # Binary Usage
//!
//! ```bash
//! # Fill the N-400 for a stored client
//! jurat fill --client CL-481516 --templates forms/
//!
//! # Build a packet through a rendering service
//! jurat packet --input client.json --forms N-400,I-130 --service-url https://render.example.com
//!
//! # Bring in completed intake links
//! jurat drafts import
//! ```

pub mod app;

pub use app::{
    clients_command, draft_import_command, draft_list_command, draft_send_command,
    draft_submit_command, effective_settings, fill_command, forms_command, import_command,
    load_settings, normalize_command, packet_command, preview_command, sample_command,
};
pub use app::{run_cli, ClientArgs, GlobalArgs, OutputFormat};
