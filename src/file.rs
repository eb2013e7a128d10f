//! Locating, reading, and writing the store file.
//!
//! A declaration names its store either as a plain path or as a file name
//! inside a [`StorageLocation`]. Locations resolve to a directory:
//!
//! - `Platform(app)`: the platform config directory (`~/.config/{app}/` on Linux).
//! - `Home(subdir)`: `{home}/{subdir}`.
//! - `Cwd` and `Path`: the current or an explicit directory.
//!
//! Reading treats a missing file as "no store yet". Writing creates parent
//! directories as needed.

use std::path::{Path, PathBuf};

use crate::discover::Storage;
use crate::error::ConfigError;
use crate::types::StorageLocation;

/// File name used when a declaration names no storage.
pub const DEFAULT_FILE: &str = "config.json";

/// Resolve a [`StorageLocation`] to a concrete directory.
///
/// Returns `None` if the directory cannot be determined (e.g. no home
/// directory found).
pub fn resolve_location(location: &StorageLocation) -> Option<PathBuf> {
    match location {
        StorageLocation::Platform(app_name) => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        StorageLocation::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        StorageLocation::Cwd => std::env::current_dir().ok(),
        StorageLocation::Path(p) => Some(p.clone()),
    }
}

/// The store file a declaration points at.
pub(crate) fn resolve_storage(storage: Option<&Storage>) -> Result<PathBuf, ConfigError> {
    match storage {
        None => Ok(PathBuf::from(DEFAULT_FILE)),
        Some(Storage::File(path)) => Ok(path.clone()),
        Some(Storage::Located(location, file_name)) => resolve_location(location)
            .map(|dir| dir.join(file_name))
            .ok_or(ConfigError::StorageUnresolved),
    }
}

/// Read the store. `Ok(None)` when it does not exist.
pub fn read_store(path: &Path) -> Result<Option<Vec<u8>>, ConfigError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Write the store, creating parent directories first.
pub fn write_store(path: &Path, bytes: &[u8]) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, bytes).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolve_explicit_path() {
        let p = PathBuf::from("/tmp/myapp");
        assert_eq!(resolve_location(&StorageLocation::Path(p.clone())), Some(p));
    }

    #[test]
    fn default_storage_is_config_json() {
        assert_eq!(resolve_storage(None).unwrap(), PathBuf::from("config.json"));
    }

    #[test]
    fn located_storage_joins_file_name() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::Located(
            StorageLocation::Path(dir.path().to_path_buf()),
            "app.json".into(),
        );
        assert_eq!(
            resolve_storage(Some(&storage)).unwrap(),
            dir.path().join("app.json")
        );
    }

    #[test]
    fn read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_store(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("config.json");
        write_store(&path, b"{}").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");
        assert_eq!(read_store(&path).unwrap().unwrap(), b"{}");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_returns_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = read_store(&path);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        // Root can read regardless of mode bits.
        if result.is_err() {
            assert!(matches!(result, Err(ConfigError::IoError { .. })));
        }
    }
}
