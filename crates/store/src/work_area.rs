//! Per-run staging directory

use nxfw_errors::{Error, StorageError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A staged file as seen by the archiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub name: String,
    pub size: u64,
}

/// Scratch directory holding the blobs of one download run
#[derive(Debug)]
pub struct WorkArea {
    root: PathBuf,
}

impl WorkArea {
    /// Start a run at `path`, removing whatever a previous run left there
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the old directory cannot be removed or the
    /// new one cannot be created.
    pub async fn begin(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = path.into();
        match fs::remove_dir_all(&root).await {
            Ok(()) => tracing::debug!(path = %root.display(), "removed stale staging directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::from_io_with_path(&e, &root).into()),
        }
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &root))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write a blob under a plain file name, replacing any previous file
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` for names that are not plain file
    /// names, or a `StorageError` if the write fails.
    pub async fn stage(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
        validate_name(name)?;
        let path = self.root.join(name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &path))?;
        Ok(path)
    }

    /// Staged files sorted by name
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the directory cannot be listed.
    pub async fn entries(&self) -> Result<Vec<StagedEntry>, Error> {
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &self.root))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            entries.push(StagedEntry {
                name,
                size: metadata.len(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Remove the directory and everything in it
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if removal fails for a reason other than the
    /// directory already being gone.
    pub async fn discard(self) -> Result<(), Error> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io_with_path(&e, &self.root).into()),
        }
    }
}

/// Accept only names that stay inside the staging directory
///
/// # Errors
///
/// Returns `StorageError::InvalidName` for empty names, `.`/`..`, and names
/// containing a path separator or NUL.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("0123.cnmt.nca").is_ok());
        for bad in ["", ".", "..", "../x", "a/b", "a\\b"] {
            assert!(validate_name(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
