//! Mnemonic and keypair providers.
//!
//! Each chain gets a [`KeyProvider`] that turns a fresh BIP-39 phrase into a
//! [`WalletRecord`]. Curve math and HD derivation are delegated to `ethers`
//! (secp256k1 / BIP-44) and `ed25519-dalek`.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::config::GeneratorConfig;
use crate::core::domain::{Chain, WalletRecord};
use crate::core::errors::WalletGenError;
use crate::core::validation::validate_record;
use crate::security::redaction::shorten;

/// Ethereum path: m/44'/60'/0'/0/0
pub const ETHEREUM_DEFAULT_PATH: &str = "m/44'/60'/0'/0/0";

/// Produces wallets for a single chain.
pub trait KeyProvider: Send + Sync {
    fn chain(&self) -> Chain;

    /// Derive the wallet for an existing phrase.
    fn derive(&self, mnemonic: &str) -> Result<WalletRecord, WalletGenError>;

    /// Draw a fresh phrase and derive its wallet.
    fn generate(&self) -> Result<WalletRecord, WalletGenError>;
}

/// Generate a random English BIP-39 phrase of 12 or 24 words.
pub fn generate_mnemonic(words: usize) -> Result<Zeroizing<String>, WalletGenError> {
    let entropy_len = match words {
        12 => 16,
        24 => 32,
        other => {
            return Err(WalletGenError::generation(format!(
                "unsupported mnemonic length: {} words",
                other
            )))
        }
    };

    let mut entropy = Zeroizing::new([0u8; 32]);
    OsRng
        .try_fill_bytes(&mut entropy[..entropy_len])
        .map_err(|e| WalletGenError::generation(format!("OS randomness unavailable: {}", e)))?;
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..entropy_len])
        .map_err(|e| WalletGenError::generation(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, WalletGenError> {
    Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletGenError::generation(format!("invalid mnemonic: {}", e)))
}

/// Ethereum wallets: BIP-44 secp256k1 key, EIP-55 address, `0x` hex private key.
#[derive(Debug, Clone)]
pub struct EthereumProvider {
    derivation_path: String,
    mnemonic_words: usize,
}

impl EthereumProvider {
    pub fn new(derivation_path: impl Into<String>, mnemonic_words: usize) -> Self {
        Self { derivation_path: derivation_path.into(), mnemonic_words }
    }
}

impl Default for EthereumProvider {
    fn default() -> Self {
        Self::new(ETHEREUM_DEFAULT_PATH, 12)
    }
}

impl KeyProvider for EthereumProvider {
    fn chain(&self) -> Chain {
        Chain::Eth
    }

    fn derive(&self, mnemonic: &str) -> Result<WalletRecord, WalletGenError> {
        use ethers::signers::coins_bip39::English;
        use ethers::signers::{MnemonicBuilder, Signer};

        // reject bad phrases before handing them to the builder, which would
        // otherwise treat an existing file path as a phrase source
        parse_mnemonic(mnemonic)?;

        let wallet = MnemonicBuilder::<English>::default()
            .phrase(mnemonic)
            .derivation_path(&self.derivation_path)
            .map_err(|e| WalletGenError::generation(format!("Failed to set derivation path: {}", e)))?
            .build()
            .map_err(|e| WalletGenError::generation(format!("Failed to build wallet: {}", e)))?;

        let key_bytes = Zeroizing::new(wallet.signer().to_bytes().to_vec());
        let private_key = format!("0x{}", hex::encode(key_bytes.as_slice()));

        let address = ethers::utils::to_checksum(&wallet.address(), None);
        debug!(address = %shorten(&address), "Derived Ethereum wallet");

        Ok(WalletRecord::new(address, private_key, mnemonic))
    }

    fn generate(&self) -> Result<WalletRecord, WalletGenError> {
        let mnemonic = generate_mnemonic(self.mnemonic_words)?;
        let record = self.derive(&mnemonic)?;
        validate_record(Chain::Eth, &record).map_err(|e| WalletGenError::generation(e.to_string()))?;
        Ok(record)
    }
}

/// Solana wallets: ed25519 keypair seeded from the first 32 bytes of the BIP-39 seed.
#[derive(Debug, Clone)]
pub struct SolanaProvider {
    mnemonic_words: usize,
}

impl SolanaProvider {
    pub fn new(mnemonic_words: usize) -> Self {
        Self { mnemonic_words }
    }
}

impl Default for SolanaProvider {
    fn default() -> Self {
        Self::new(12)
    }
}

impl KeyProvider for SolanaProvider {
    fn chain(&self) -> Chain {
        Chain::Sol
    }

    fn derive(&self, mnemonic: &str) -> Result<WalletRecord, WalletGenError> {
        use ed25519_dalek::SigningKey;

        let parsed = parse_mnemonic(mnemonic)?;
        let seed = Zeroizing::new(parsed.to_seed(""));
        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&seed[..32]);

        let signing_key = SigningKey::from_bytes(&secret);
        let address = bs58::encode(signing_key.verifying_key().to_bytes()).into_string();
        let private_key = hex::encode(secret.as_slice());
        debug!(address = %shorten(&address), "Derived Solana wallet");

        Ok(WalletRecord::new(address, private_key, mnemonic))
    }

    fn generate(&self) -> Result<WalletRecord, WalletGenError> {
        let mnemonic = generate_mnemonic(self.mnemonic_words)?;
        let record = self.derive(&mnemonic)?;
        validate_record(Chain::Sol, &record).map_err(|e| WalletGenError::generation(e.to_string()))?;
        Ok(record)
    }
}

/// Pick the provider for a chain using the configured mnemonic length and path.
pub fn provider_for(chain: Chain, config: &GeneratorConfig) -> Box<dyn KeyProvider> {
    match chain {
        Chain::Eth => Box::new(EthereumProvider::new(
            config.derivation.eth_path.clone(),
            config.mnemonic_words,
        )),
        Chain::Sol => Box::new(SolanaProvider::new(config.mnemonic_words)),
    }
}
