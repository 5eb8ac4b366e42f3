// filepath: src/core/wallet/mod.rs
pub mod batch;
pub mod provider;

pub use batch::{generate, BatchGenerator, Progress};
pub use provider::{generate_mnemonic, provider_for, EthereumProvider, KeyProvider, SolanaProvider};
