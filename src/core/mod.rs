pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;
pub mod wallet;

pub use config::GeneratorConfig;
pub use domain::{Chain, WalletBatch, WalletRecord};
pub use errors::WalletGenError;
