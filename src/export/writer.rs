//! Spreadsheet export with collision-free naming and an atomic, owner-only write.

use rust_xlsxwriter::{Format, Workbook};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::config::GeneratorConfig;
use crate::core::domain::{Chain, WalletBatch, WalletRecord};
use crate::core::errors::WalletGenError;
use crate::export::permissions;

/// Column headers, in output order.
pub const COLUMNS: [&str; 3] = ["address", "private_key", "mnemonic"];

const EXTENSION: &str = "xlsx";

/// Applies owner-only permissions to a path.
type PermissionSetter = fn(&Path) -> io::Result<()>;

/// Result of a finished export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub chain: Chain,
    pub rows: usize,
    /// Set when the data was written but owner-only permissions could not be applied.
    pub permission_warning: Option<String>,
}

/// Writes wallet batches under `<output_dir>/<chain>_wallets/`.
#[derive(Clone)]
pub struct ExportWriter {
    output_dir: PathBuf,
    sheet_name: String,
    max_suffix_attempts: u32,
    restrict: PermissionSetter,
}

impl fmt::Debug for ExportWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportWriter")
            .field("output_dir", &self.output_dir)
            .field("sheet_name", &self.sheet_name)
            .field("max_suffix_attempts", &self.max_suffix_attempts)
            .finish_non_exhaustive()
    }
}

impl ExportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            sheet_name: "Wallets".to_string(),
            max_suffix_attempts: 10_000,
            restrict: permissions::restrict_file,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            sheet_name: config.export.sheet_name.clone(),
            max_suffix_attempts: config.export.max_suffix_attempts,
            restrict: permissions::restrict_file,
        }
    }

    pub fn with_max_suffix_attempts(mut self, attempts: u32) -> Self {
        self.max_suffix_attempts = attempts;
        self
    }

    #[cfg(test)]
    fn with_permission_setter(mut self, restrict: PermissionSetter) -> Self {
        self.restrict = restrict;
        self
    }

    /// Validate, render and persist `batch`.
    ///
    /// Nothing touches the disk until every record has passed validation.
    pub fn export(&self, batch: &WalletBatch, target_filename: &str) -> Result<ExportOutcome, WalletGenError> {
        validate_records(batch.records())?;

        let chain = classify_chain(batch.records());
        if chain != batch.chain() {
            warn!(requested = %batch.chain(), detected = %chain, "Key format does not match batch chain, routing by key format");
        }

        let dir = self.output_dir.join(chain.output_subdir());
        fs::create_dir_all(&dir).map_err(|e| {
            WalletGenError::ExportIo(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let stem = file_stem(target_filename, chain);
        let workbook = render_workbook(batch.records(), &self.sheet_name)?;
        let (staged, mut warning) = stage(&dir, &workbook, self.restrict)?;
        let path = self.persist_unique(staged, &dir, &stem)?;

        // the data stays on disk even when permissions cannot be tightened
        if let Err(e) = (self.restrict)(&path) {
            warn!(path = %path.display(), error = %e, "Failed to restrict permissions on exported file");
            warning.get_or_insert_with(|| format!("could not restrict permissions on {}: {}", path.display(), e));
        }

        info!(path = %path.display(), rows = batch.len(), chain = %chain, "Wallet batch exported");
        Ok(ExportOutcome { path, chain, rows: batch.len(), permission_warning: warning })
    }

    fn persist_unique(&self, staged: NamedTempFile, dir: &Path, stem: &str) -> Result<PathBuf, WalletGenError> {
        let mut staged = staged;
        for attempt in 0..=self.max_suffix_attempts {
            let candidate = candidate_path(dir, stem, attempt);
            match staged.persist_noclobber(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %candidate.display(), "Export target exists, trying next suffix");
                    staged = e.file;
                }
                Err(e) => {
                    return Err(WalletGenError::ExportIo(format!(
                        "cannot move export into {}: {}",
                        candidate.display(),
                        e.error
                    )))
                }
            }
        }
        Err(WalletGenError::ExportIo(format!(
            "no free file name for {}.{} after {} attempts",
            stem, EXTENSION, self.max_suffix_attempts
        )))
    }
}

/// Every record needs an address, a private key and a mnemonic; an empty batch is rejected.
pub fn validate_records(records: &[WalletRecord]) -> Result<(), WalletGenError> {
    if records.is_empty() {
        return Err(WalletGenError::MalformedRecord { index: 0, field: "address" });
    }
    for (index, record) in records.iter().enumerate() {
        if let Some(field) = record.missing_field() {
            return Err(WalletGenError::MalformedRecord { index, field });
        }
    }
    Ok(())
}

/// `eth` when every private key carries the `0x` prefix, `sol` otherwise.
pub fn classify_chain(records: &[WalletRecord]) -> Chain {
    if !records.is_empty() && records.iter().all(|r| r.private_key().starts_with("0x")) {
        Chain::Eth
    } else {
        Chain::Sol
    }
}

/// File stem from the requested name, falling back to `<chain>_wallets`.
fn file_stem(target_filename: &str, chain: Chain) -> String {
    Path::new(target_filename.trim())
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .filter(|s| !(s.starts_with('.') && s[1..].eq_ignore_ascii_case(EXTENSION)))
        .map(str::to_string)
        .unwrap_or_else(|| chain.output_subdir())
}

/// `<stem>.xlsx` for attempt 0, `<stem>_<n>.xlsx` afterwards.
pub fn candidate_path(dir: &Path, stem: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        dir.join(format!("{}.{}", stem, EXTENSION))
    } else {
        dir.join(format!("{}_{}.{}", stem, attempt, EXTENSION))
    }
}

/// Render the batch as an in-memory `.xlsx` with auto-sized columns.
pub fn render_workbook(records: &[WalletRecord], sheet_name: &str) -> Result<Zeroizing<Vec<u8>>, WalletGenError> {
    let mut workbook = Workbook::new();
    {
        let header = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
        for (col, name) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            let cells = [record.address(), record.private_key(), record.mnemonic()];
            for (col, value) in cells.iter().enumerate() {
                worksheet.write_string(row, col as u16, *value)?;
                widths[col] = widths[col].max(value.chars().count());
            }
        }

        for (col, width) in widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, (*width + 2) as f64)?;
        }
    }
    Ok(Zeroizing::new(workbook.save_to_buffer()?))
}

/// Write `bytes` to an owner-only staging file next to the final destination.
fn stage(
    dir: &Path,
    bytes: &[u8],
    restrict: PermissionSetter,
) -> Result<(NamedTempFile, Option<String>), WalletGenError> {
    let mut staged = tempfile::Builder::new()
        .prefix(".walletgen-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| WalletGenError::ExportIo(format!("cannot create staging file in {}: {}", dir.display(), e)))?;

    let mut warning = None;
    if let Err(e) = restrict(staged.path()) {
        warn!(error = %e, "Failed to restrict permissions on staging file");
        warning = Some(format!("could not restrict staging file permissions: {}", e));
    }

    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    Ok((staged, warning))
}

/// Atomically replace `path` with `bytes`, leaving it owner-only.
///
/// Returns a warning when permissions could not be applied; the data is on disk either way.
pub fn secure_write(path: &Path, bytes: &[u8]) -> Result<Option<String>, WalletGenError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let (staged, mut warning) = stage(&dir, bytes, permissions::restrict_file)?;
    staged.persist(path).map_err(|e| {
        WalletGenError::ExportIo(format!("cannot replace {}: {}", path.display(), e.error))
    })?;

    if let Err(e) = permissions::restrict_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to restrict permissions after write");
        warning.get_or_insert_with(|| format!("could not restrict permissions on {}: {}", path.display(), e));
    }
    Ok(warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn eth_record(n: u8) -> WalletRecord {
        WalletRecord::new(format!("0x{:040x}", n), format!("0x{}", "ab".repeat(32)), "abandon about")
    }

    #[test]
    fn test_classify_chain() {
        assert_eq!(classify_chain(&[eth_record(1), eth_record(2)]), Chain::Eth);
        let mixed = [eth_record(1), WalletRecord::new("So1", "ab".repeat(32), "m")];
        assert_eq!(classify_chain(&mixed), Chain::Sol);
    }

    #[test]
    fn test_candidate_path() {
        let dir = Path::new("/out");
        assert_eq!(candidate_path(dir, "eth_wallets", 0), PathBuf::from("/out/eth_wallets.xlsx"));
        assert_eq!(candidate_path(dir, "eth_wallets", 3), PathBuf::from("/out/eth_wallets_3.xlsx"));
    }

    #[test]
    fn test_file_stem_strips_directories_and_extension() {
        assert_eq!(file_stem("../../etc/batch.xlsx", Chain::Eth), "batch");
        assert_eq!(file_stem("report.csv", Chain::Eth), "report");
        assert_eq!(file_stem("", Chain::Sol), "sol_wallets");
    }

    #[test]
    fn test_file_stem_bare_extension_falls_back() {
        assert_eq!(file_stem(".xlsx", Chain::Eth), "eth_wallets");
        assert_eq!(file_stem("out/.XLSX", Chain::Sol), "sol_wallets");
        assert_eq!(file_stem(".hidden.xlsx", Chain::Eth), ".hidden");
    }

    #[test]
    fn test_validate_records_reports_index() {
        let records = [eth_record(1), WalletRecord::new("0x1", "0x2", "")];
        match validate_records(&records) {
            Err(WalletGenError::MalformedRecord { index, field }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "mnemonic");
            }
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_records_rejects_empty_batch() {
        assert!(matches!(validate_records(&[]), Err(WalletGenError::MalformedRecord { .. })));
    }

    #[test]
    fn test_render_workbook_is_zip() {
        let bytes = render_workbook(&[eth_record(1)], "Wallets").unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_secure_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "old").unwrap();

        let warning = secure_write(&path, b"new").unwrap();
        assert!(warning.is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(permissions::is_owner_only(&path).unwrap());
        // staging file is gone
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    fn refuse_permissions(_: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "chmod refused"))
    }

    #[test]
    fn test_permission_failure_keeps_export() {
        use calamine::{open_workbook, Reader, Xlsx};

        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path()).with_permission_setter(refuse_permissions);
        let batch = WalletBatch::from_records(Chain::Eth, vec![eth_record(1), eth_record(2)]);

        let outcome = writer.export(&batch, "kept.xlsx").unwrap();
        let warning = outcome.permission_warning.clone().expect("permission warning");
        assert!(warning.contains("chmod refused"));
        assert_eq!(outcome.path, dir.path().join("eth_wallets").join("kept.xlsx"));
        assert_eq!(outcome.rows, 2);

        let mut workbook: Xlsx<_> = open_workbook(&outcome.path).unwrap();
        let range = workbook.worksheet_range("Wallets").unwrap();
        assert_eq!(range.height(), 3);
        assert_eq!(range.get_value((1, 0)).map(|c| c.to_string()), Some(eth_record(1).address().to_string()));
    }

    #[test]
    fn test_suffix_limit_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("eth_wallets");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("taken.xlsx"), "x").unwrap();
        fs::write(sub.join("taken_1.xlsx"), "x").unwrap();

        let writer = ExportWriter::new(dir.path()).with_max_suffix_attempts(1);
        let batch = WalletBatch::from_records(Chain::Eth, vec![eth_record(1)]);
        let err = writer.export(&batch, "taken.xlsx").unwrap_err();
        assert!(matches!(err, WalletGenError::ExportIo(_)));
        // no staging leftovers
        let leftovers: Vec<_> = fs::read_dir(&sub)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
