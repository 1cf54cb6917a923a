use crate::domain::ports::Storage;
use crate::utils::error::{Result, RiskError};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at `base_path`. Absolute paths bypass the root.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.resolve(path)).await?)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        let dir = match full_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;

        let data = data.to_vec();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &full_path, &data))
            .await
            .map_err(|e| RiskError::IoError(std::io::Error::other(e)))?
    }
}

/// Writes into a uniquely named temp file in `dir`, then renames it over `target`.
/// The temp file is removed whenever the write or the rename fails.
fn write_atomically(dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    let mut file = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| RiskError::IoError(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_under_base_path() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        assert!(!storage.exists("models/model.json").await.unwrap());
        storage.write_file("models/model.json", b"{}").await.unwrap();

        assert!(storage.exists("models/model.json").await.unwrap());
        assert_eq!(storage.read_file("models/model.json").await.unwrap(), b"{}");
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("models"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("model.json")]);
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        // A non-empty directory in the way makes the final rename fail.
        std::fs::create_dir_all(temp_dir.path().join("model.json/occupied")).unwrap();

        assert!(storage.write_file("model.json", b"{}").await.is_err());

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("model.json")]);
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_same_path_both_succeed() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let first = vec![b'a'; 64 * 1024];
        let second = vec![b'b'; 64 * 1024];
        let (a, b) = tokio::join!(
            storage.write_file("model.json", &first),
            storage.write_file("model.json", &second)
        );
        a.unwrap();
        b.unwrap();

        let written = storage.read_file("model.json").await.unwrap();
        assert!(written == first || written == second);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_absolute_paths_ignore_base() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("abs.json");
        let storage = LocalStorage::new("/nonexistent-base");

        storage
            .write_file(target.to_str().unwrap(), b"[]")
            .await
            .unwrap();
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_missing_file_read_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        assert!(storage.read_file("absent.json").await.is_err());
    }
}
