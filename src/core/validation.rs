use anyhow::Result;
use regex::Regex;
use sha3::{Digest, Keccak256};

use crate::core::domain::{Chain, WalletRecord};

/// Validates an Ethereum address.
pub fn validate_ethereum_address(address: &str) -> Result<()> {
    if !address.starts_with("0x") || address.len() != 42 {
        return Err(anyhow::anyhow!("Invalid Ethereum address format"));
    }
    let hex_regex = Regex::new(r"^0x[0-9a-fA-F]{40}$")
        .expect("Hardcoded regex should always compile");
    if !hex_regex.is_match(address) {
        return Err(anyhow::anyhow!("Invalid Ethereum address characters"));
    }
    // EIP-55: if mixed-case, enforce checksum. All-lower or all-upper acceptable for compatibility.
    let body = &address[2..];
    let is_all_lower = body.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
    let is_all_upper = body.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(());
    }
    if !is_eip55_checksum_valid(address) {
        return Err(anyhow::anyhow!("Invalid EIP-55 checksum for Ethereum address"));
    }
    Ok(())
}

fn is_eip55_checksum_valid(addr: &str) -> bool {
    if addr.len() != 42 || !addr.starts_with("0x") {
        return false;
    }
    let body = &addr[2..];
    let lower = body.to_lowercase();
    let mut keccak = Keccak256::new();
    keccak.update(lower.as_bytes());
    let hash = keccak.finalize();
    for (i, ch) in body.chars().enumerate() {
        let nibble = (hash[i / 2] >> (4 * (1 - (i % 2)))) & 0x0f;
        match ch {
            'a'..='f' => {
                if nibble >= 8 {
                    return false;
                }
            }
            'A'..='F' => {
                if nibble < 8 {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Validates a `0x`-prefixed 32-byte secp256k1 private key in hex.
pub fn validate_ethereum_private_key(key: &str) -> Result<()> {
    let body = key
        .strip_prefix("0x")
        .ok_or_else(|| anyhow::anyhow!("Ethereum private key must carry the 0x prefix"))?;
    if body.len() != 64 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow::anyhow!("Ethereum private key must be 64 hex characters"));
    }
    Ok(())
}

pub fn validate_base58_address(address: &str) -> Result<()> {
    if address.len() < 32 || address.len() > 44 {
        return Err(anyhow::anyhow!("Invalid base58 address length"));
    }
    // Check if it's valid base58
    match bs58::decode(address).into_vec() {
        Ok(decoded) => {
            if decoded.len() != 32 {
                return Err(anyhow::anyhow!("Invalid base58 address decoded length"));
            }
        }
        Err(_) => return Err(anyhow::anyhow!("Invalid base58 address encoding")),
    }
    Ok(())
}

/// Validates an unprefixed hex ed25519 secret (32 bytes).
pub fn validate_solana_private_key(key: &str) -> Result<()> {
    if key.starts_with("0x") {
        return Err(anyhow::anyhow!("Solana private key must not carry the 0x prefix"));
    }
    let bytes = hex::decode(key).map_err(|_| anyhow::anyhow!("Solana private key is not hex"))?;
    if bytes.len() != 32 {
        return Err(anyhow::anyhow!("Solana private key must decode to 32 bytes"));
    }
    Ok(())
}

/// Validates a BIP-39 English mnemonic (word list and checksum).
pub fn validate_mnemonic(phrase: &str) -> Result<()> {
    bip39::Mnemonic::parse_in_normalized(bip39::Language::English, phrase)
        .map_err(|e| anyhow::anyhow!("Invalid mnemonic: {}", e))?;
    Ok(())
}

/// Validates every field of a generated record against its chain's format.
pub fn validate_record(chain: Chain, record: &WalletRecord) -> Result<()> {
    match chain {
        Chain::Eth => {
            validate_ethereum_address(record.address())?;
            validate_ethereum_private_key(record.private_key())?;
        }
        Chain::Sol => {
            validate_base58_address(record.address())?;
            validate_solana_private_key(record.private_key())?;
        }
    }
    validate_mnemonic(record.mnemonic())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_validate_ethereum_address_valid() {
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44e").is_ok());
    }

    #[test]
    fn test_validate_ethereum_address_invalid_length() {
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44").is_err());
    }

    #[test]
    fn test_validate_ethereum_address_invalid_chars() {
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44g").is_err());
    }

    #[test]
    fn test_validate_ethereum_address_bad_checksum() {
        // flipped case of the first letter breaks EIP-55
        assert!(validate_ethereum_address("0x742D35Cc6634C0532925a3b844Bc454e4438f44e").is_err());
    }

    #[test]
    fn test_validate_ethereum_private_key() {
        let key = format!("0x{}", "ab".repeat(32));
        assert!(validate_ethereum_private_key(&key).is_ok());
        assert!(validate_ethereum_private_key(&"ab".repeat(32)).is_err());
        assert!(validate_ethereum_private_key("0x1234").is_err());
    }

    #[test]
    fn test_validate_base58_address_valid() {
        assert!(validate_base58_address("11111111111111111111111111111112").is_ok());
    }

    #[test]
    fn test_validate_base58_address_invalid() {
        assert!(validate_base58_address("invalid").is_err());
        assert!(validate_base58_address("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl").is_err());
    }

    #[test]
    fn test_validate_solana_private_key() {
        assert!(validate_solana_private_key(&"07".repeat(32)).is_ok());
        assert!(validate_solana_private_key(&format!("0x{}", "07".repeat(32))).is_err());
        assert!(validate_solana_private_key(&"07".repeat(16)).is_err());
    }

    #[test]
    fn test_validate_mnemonic() {
        assert!(validate_mnemonic(ABANDON).is_ok());
        assert!(validate_mnemonic("abandon abandon abandon").is_err());
        // bad checksum word
        assert!(validate_mnemonic(&ABANDON.replace("about", "abandon")).is_err());
    }

    #[test]
    fn test_validate_record_checks_chain_format() {
        let eth = WalletRecord::new(
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
            format!("0x{}", "11".repeat(32)),
            ABANDON,
        );
        assert!(validate_record(Chain::Eth, &eth).is_ok());
        assert!(validate_record(Chain::Sol, &eth).is_err());
    }
}
