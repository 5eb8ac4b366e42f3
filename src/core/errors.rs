use thiserror::Error;

/// Error type shared by generation, export and the security helpers.
#[derive(Debug, Error)]
pub enum WalletGenError {
    /// Chain text was neither `eth` nor `sol`.
    #[error("Invalid chain: {0} (expected eth or sol)")]
    InvalidChain(String),

    /// Requested wallet count was missing, zero or not a number.
    #[error("Invalid count: {0}")]
    InvalidCount(String),

    /// A record handed to the exporter lacks a required field.
    #[error("Malformed record #{index}: missing {field}")]
    MalformedRecord { index: usize, field: &'static str },

    /// Output path selection, spreadsheet rendering or the atomic write failed.
    #[error("Export IO error: {0}")]
    ExportIo(String),

    /// Mnemonic generation or key derivation failed.
    #[error("Generation error after {completed} wallet(s): {reason}")]
    Generation { completed: usize, reason: String },

    /// A runtime guard probe could not run. Never fatal.
    #[error("Environment check error: {0}")]
    EnvironmentCheck(String),

    /// Configuration file or environment override could not be applied.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading the interactive answers or writing the prompt failed.
    #[error("Prompt I/O error: {0}")]
    Prompt(String),
}

impl WalletGenError {
    /// Build a generation error for a provider failure before any record exists.
    pub fn generation(reason: impl Into<String>) -> Self {
        Self::Generation { completed: 0, reason: reason.into() }
    }

    /// Errors the interactive prompt recovers from by asking again.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidChain(_) | Self::InvalidCount(_))
    }

    /// Process exit code for this failure.
    ///
    /// 0 is success and 2 is reserved for an interrupted run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidChain(_) | Self::InvalidCount(_) | Self::Config(_) | Self::Prompt(_) => 1,
            Self::MalformedRecord { .. } | Self::ExportIo(_) => 3,
            Self::Generation { .. } => 4,
            // guard failures only ever surface as warnings
            Self::EnvironmentCheck(_) => 0,
        }
    }
}

impl From<std::io::Error> for WalletGenError {
    fn from(err: std::io::Error) -> Self {
        WalletGenError::ExportIo(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for WalletGenError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        WalletGenError::ExportIo(format!("spreadsheet rendering failed: {}", err))
    }
}

impl From<toml::de::Error> for WalletGenError {
    fn from(err: toml::de::Error) -> Self {
        WalletGenError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_malformed_record() {
        let err = WalletGenError::MalformedRecord { index: 3, field: "mnemonic" };
        assert_eq!(format!("{}", err), "Malformed record #3: missing mnemonic");
    }

    #[test]
    fn test_display_generation_error() {
        let err = WalletGenError::Generation { completed: 2, reason: "rng".into() };
        assert_eq!(format!("{}", err), "Generation error after 2 wallet(s): rng");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(WalletGenError::InvalidChain("btc".into()).exit_code(), 1);
        assert_eq!(WalletGenError::InvalidCount("0".into()).exit_code(), 1);
        assert_eq!(WalletGenError::Config("bad".into()).exit_code(), 1);
        assert_eq!(WalletGenError::ExportIo("disk".into()).exit_code(), 3);
        assert_eq!(WalletGenError::generation("boom").exit_code(), 4);
        assert_eq!(WalletGenError::Prompt("broken pipe".into()).exit_code(), 1);
    }

    #[test]
    fn test_is_validation() {
        assert!(WalletGenError::InvalidChain("x".into()).is_validation());
        assert!(WalletGenError::InvalidCount("x".into()).is_validation());
        assert!(!WalletGenError::ExportIo("x".into()).is_validation());
        assert!(!WalletGenError::Prompt("x".into()).is_validation());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: WalletGenError = io.into();
        match err {
            WalletGenError::ExportIo(msg) => assert_eq!(msg, "denied"),
            _ => panic!("Expected ExportIo variant"),
        }
    }
}
