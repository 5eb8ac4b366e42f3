// src/lib.rs

pub mod cli;
pub mod core;
pub mod export;
pub mod security;

pub use crate::core::wallet::generate;
pub use crate::core::{Chain, GeneratorConfig, WalletBatch, WalletGenError, WalletRecord};
pub use crate::export::{ExportOutcome, ExportWriter};
