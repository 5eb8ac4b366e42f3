use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::errors::WalletGenError;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "walletgen.toml";

/// Runtime guard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Run the guard before generation
    #[serde(default = "GuardConfig::default_enabled")]
    pub enabled: bool,

    /// Print one line per check
    #[serde(default = "GuardConfig::default_verbose")]
    pub verbose: bool,

    /// Address the outbound probe connects to
    #[serde(default = "GuardConfig::default_probe_addr")]
    pub probe_addr: String,

    /// Connect timeout (milliseconds)
    #[serde(default = "GuardConfig::default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl GuardConfig {
    fn default_enabled() -> bool { true }
    fn default_verbose() -> bool { true }
    fn default_probe_addr() -> String { "8.8.8.8:53".to_string() }
    fn default_probe_timeout_ms() -> u64 { 1_000 }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            verbose: Self::default_verbose(),
            probe_addr: Self::default_probe_addr(),
            probe_timeout_ms: Self::default_probe_timeout_ms(),
        }
    }
}

/// Spreadsheet export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "ExportConfig::default_sheet_name")]
    pub sheet_name: String,

    /// Upper bound on `_N` suffixes tried before giving up
    #[serde(default = "ExportConfig::default_max_suffix_attempts")]
    pub max_suffix_attempts: u32,
}

impl ExportConfig {
    fn default_sheet_name() -> String { "Wallets".to_string() }
    fn default_max_suffix_attempts() -> u32 { 10_000 }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: Self::default_sheet_name(),
            max_suffix_attempts: Self::default_max_suffix_attempts(),
        }
    }
}

/// Derivation path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationConfig {
    #[serde(default = "DerivationConfig::default_eth_path")]
    pub eth_path: String,
}

impl DerivationConfig {
    fn default_eth_path() -> String { "m/44'/60'/0'/0/0".to_string() }
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self { eth_path: Self::default_eth_path() }
    }
}

/// Top-level generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Root under which `<chain>_wallets/` directories are created
    #[serde(default = "GeneratorConfig::default_output_dir")]
    pub output_dir: PathBuf,

    /// Delay between two generations (milliseconds)
    #[serde(default = "GeneratorConfig::default_pacing_ms")]
    pub pacing_ms: u64,

    /// Mnemonic length in words (12 or 24)
    #[serde(default = "GeneratorConfig::default_mnemonic_words")]
    pub mnemonic_words: usize,

    #[serde(default)]
    pub derivation: DerivationConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl GeneratorConfig {
    fn default_output_dir() -> PathBuf { PathBuf::from(".") }
    fn default_pacing_ms() -> u64 { 500 }
    fn default_mnemonic_words() -> usize { 12 }

    /// Parse a TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, WalletGenError> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config the way the binary does.
    ///
    /// Lookup order: explicit path, `WALLETGEN_CONFIG`, `walletgen.toml` in the
    /// working directory, built-in defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, WalletGenError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("WALLETGEN_CONFIG").ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::read_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::read_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, WalletGenError> {
        let content = fs::read_to_string(path).map_err(|e| {
            WalletGenError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `WALLETGEN_OUTPUT_DIR` and `WALLETGEN_PACING_MS`.
    pub fn apply_env_overrides(&mut self) -> Result<(), WalletGenError> {
        if let Ok(dir) = std::env::var("WALLETGEN_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(raw) = std::env::var("WALLETGEN_PACING_MS") {
            self.pacing_ms = raw.trim().parse().map_err(|_| {
                WalletGenError::Config(format!("WALLETGEN_PACING_MS must be an integer, got {:?}", raw))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), WalletGenError> {
        if !matches!(self.mnemonic_words, 12 | 24) {
            return Err(WalletGenError::Config(format!(
                "mnemonic_words must be 12 or 24, got {}",
                self.mnemonic_words
            )));
        }
        if self.export.max_suffix_attempts == 0 {
            return Err(WalletGenError::Config("export.max_suffix_attempts must be at least 1".into()));
        }
        if self.export.sheet_name.trim().is_empty() {
            return Err(WalletGenError::Config("export.sheet_name must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
            pacing_ms: Self::default_pacing_ms(),
            mnemonic_words: Self::default_mnemonic_words(),
            derivation: DerivationConfig::default(),
            guard: GuardConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.pacing_ms, 500);
        assert_eq!(config.mnemonic_words, 12);
        assert_eq!(config.guard.probe_addr, "8.8.8.8:53");
        assert_eq!(config.export.sheet_name, "Wallets");
        assert_eq!(config.derivation.eth_path, "m/44'/60'/0'/0/0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            pacing_ms = 0
            [guard]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.pacing_ms, 0);
        assert!(!config.guard.enabled);
        assert_eq!(config.guard.probe_timeout_ms, 1_000);
        assert_eq!(config.export.max_suffix_attempts, 10_000);
    }

    #[test]
    fn test_rejects_bad_word_count() {
        let err = GeneratorConfig::from_toml_str("mnemonic_words = 15").unwrap_err();
        assert!(matches!(err, WalletGenError::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = GeneratorConfig::from_toml_str("pacing_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, WalletGenError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("WALLETGEN_OUTPUT_DIR", "/tmp/walletgen-out");
        std::env::set_var("WALLETGEN_PACING_MS", "7");
        let mut config = GeneratorConfig::default();
        let result = config.apply_env_overrides();
        std::env::remove_var("WALLETGEN_OUTPUT_DIR");
        std::env::remove_var("WALLETGEN_PACING_MS");

        result.unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/walletgen-out"));
        assert_eq!(config.pacing_ms, 7);
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_garbage() {
        std::env::set_var("WALLETGEN_PACING_MS", "fast");
        let mut config = GeneratorConfig::default();
        let result = config.apply_env_overrides();
        std::env::remove_var("WALLETGEN_PACING_MS");
        assert!(matches!(result, Err(WalletGenError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "mnemonic_words = 24\n[export]\nsheet_name = \"Keys\"\n").unwrap();

        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.mnemonic_words, 24);
        assert_eq!(config.export.sheet_name, "Keys");
    }

    #[test]
    #[serial]
    fn test_load_missing_explicit_file_fails() {
        let err = GeneratorConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, WalletGenError::Config(_)));
    }
}
