//! Owner-only permissions for exported files and secure directories.
//!
//! Unix gets real mode bits (`0o600` files, `0o700` directories). Other
//! platforms only get the read-only attribute, the closest thing std offers.

use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_readonly(path: &Path, readonly: bool) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(readonly);
    fs::set_permissions(path, perms)
}

/// Restrict a file to its owner (read/write).
pub fn restrict_file(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        set_mode(path, 0o600)
    }
    #[cfg(not(unix))]
    {
        set_readonly(path, true)
    }
}

/// Restrict a directory to its owner.
pub fn restrict_dir(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        set_mode(path, 0o700)
    }
    #[cfg(not(unix))]
    {
        set_readonly(path, true)
    }
}

/// Undo the restrictive attribute so the owner can delete the entry.
///
/// Only needed where the read-only attribute blocks deletion; unix owners can
/// always remove what they created, so this is a no-op there.
pub fn relax(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        let _ = path;
        Ok(())
    }
    #[cfg(not(unix))]
    {
        set_readonly(path, false)
    }
}

/// Whether nobody but the owner can read `path`.
pub fn is_owner_only(path: &Path) -> io::Result<bool> {
    let metadata = fs::metadata(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Ok(metadata.permissions().mode() & 0o077 == 0)
    }
    #[cfg(not(unix))]
    {
        Ok(metadata.permissions().readonly())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_restrict_file_sets_0600() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.bin");
        fs::write(&path, b"x").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_owner_only(&path).unwrap());

        restrict_file(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(is_owner_only(&path).unwrap());
    }

    #[test]
    fn test_restrict_dir_sets_0700() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("vault");
        fs::create_dir(&sub).unwrap();
        restrict_dir(&sub).unwrap();
        let mode = fs::metadata(&sub).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn test_restrict_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(restrict_file(&dir.path().join("nope")).is_err());
    }
}
