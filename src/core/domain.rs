use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::errors::WalletGenError;
use crate::security::redaction::redact_body;

/// Chains the generator can produce wallets for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Eth,
    Sol,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Eth => "eth",
            Chain::Sol => "sol",
        }
    }

    /// Directory (under the output root) that holds this chain's exports.
    pub fn output_subdir(&self) -> String {
        format!("{}_wallets", self.as_str())
    }

    /// Default export file name when the caller does not choose one.
    pub fn default_filename(&self) -> String {
        format!("{}_wallets.xlsx", self.as_str())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = WalletGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eth" => Ok(Chain::Eth),
            "sol" => Ok(Chain::Sol),
            other => Err(WalletGenError::InvalidChain(other.to_string())),
        }
    }
}

/// Parse a wallet count. Must be a positive integer.
pub fn parse_count(s: &str) -> Result<u32, WalletGenError> {
    let count: u32 = s
        .trim()
        .parse()
        .map_err(|_| WalletGenError::InvalidCount(format!("{:?} is not a number", s.trim())))?;
    if count == 0 {
        return Err(WalletGenError::InvalidCount("count must be greater than 0".into()));
    }
    Ok(count)
}

/// One generated wallet. Fields are fixed at construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct WalletRecord {
    address: String,
    private_key: String,
    mnemonic: String,
}

impl WalletRecord {
    pub fn new(
        address: impl Into<String>,
        private_key: impl Into<String>,
        mnemonic: impl Into<String>,
    ) -> Self {
        Self { address: address.into(), private_key: private_key.into(), mnemonic: mnemonic.into() }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Name of the first required field that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.address.trim().is_empty() {
            Some("address")
        } else if self.private_key.trim().is_empty() {
            Some("private_key")
        } else if self.mnemonic.trim().is_empty() {
            Some("mnemonic")
        } else {
            None
        }
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("address", &self.address)
            .field("private_key", &redact_body(&self.private_key))
            .field("mnemonic", &redact_body(&self.mnemonic))
            .finish()
    }
}

/// Records produced by one generator run, in generation order.
#[derive(Debug, Clone)]
pub struct WalletBatch {
    chain: Chain,
    records: Vec<WalletRecord>,
}

impl WalletBatch {
    pub fn new(chain: Chain) -> Self {
        Self { chain, records: Vec::new() }
    }

    pub fn with_capacity(chain: Chain, capacity: usize) -> Self {
        Self { chain, records: Vec::with_capacity(capacity) }
    }

    pub fn from_records(chain: Chain, records: Vec<WalletRecord>) -> Self {
        Self { chain, records }
    }

    pub fn push(&mut self, record: WalletRecord) {
        self.records.push(record);
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn records(&self) -> &[WalletRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WalletRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a WalletBatch {
    type Item = &'a WalletRecord;
    type IntoIter = std::slice::Iter<'a, WalletRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
