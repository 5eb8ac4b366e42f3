//! Spreadsheet export of generated wallets.
//!
//! The writer never leaves secrets readable by other users: data is staged in
//! an owner-only sibling file and moved into place atomically.

pub mod permissions;
pub mod writer;

pub use writer::{secure_write, ExportOutcome, ExportWriter, COLUMNS};
