//! Process-lifetime secret store.
//!
//! Lookup keys are replaced by their SHA-256 digest; values are kept as given
//! (zeroized on teardown). The store can also own a `secure_wallet_*` temp
//! directory that is removed on teardown.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::errors::WalletGenError;
use crate::export::permissions;

/// Hex SHA-256 of a lookup key.
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

#[derive(Default)]
pub struct SecureStore {
    entries: HashMap<String, Zeroizing<String>>,
    temp_dir: Option<TempDir>,
}

impl SecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(hash_key(key), Zeroizing::new(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&hash_key(key)).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create (once) an owner-only `secure_wallet_*` directory under the system temp dir.
    pub fn create_secure_tempdir(&mut self) -> Result<PathBuf, WalletGenError> {
        if let Some(dir) = &self.temp_dir {
            return Ok(dir.path().to_path_buf());
        }
        let dir = tempfile::Builder::new()
            .prefix("secure_wallet_")
            .tempdir()
            .map_err(|e| WalletGenError::ExportIo(format!("cannot create secure temp dir: {}", e)))?;
        permissions::restrict_dir(dir.path())?;
        info!(path = %dir.path().display(), "Secure temp directory created");
        let path = dir.path().to_path_buf();
        self.temp_dir = Some(dir);
        Ok(path)
    }

    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }

    /// Clear every entry and remove the temp directory. Failures are logged only.
    pub fn teardown(&mut self) {
        if !self.entries.is_empty() {
            debug!(entries = self.entries.len(), "Clearing secure store");
        }
        // values zeroize on drop
        self.entries.clear();

        if let Some(dir) = self.temp_dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = permissions::relax(&path) {
                warn!(path = %path.display(), error = %e, "Failed to restore temp dir permissions");
            }
            match dir.close() {
                Ok(()) => debug!(path = %path.display(), "Secure temp directory removed"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove secure temp directory"),
            }
        }
    }
}

impl Drop for SecureStore {
    fn drop(&mut self) {
        self.teardown();
    }
}
