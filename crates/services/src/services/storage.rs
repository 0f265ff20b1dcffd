//! Disk storage for uploaded documents.
//!
//! Files are written under a single uploads directory with generated names;
//! the database keeps the original filename for download headers.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stored name")]
    InvalidName,
    #[error("file not found")]
    NotFound,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub stored_name: String,
    pub size_bytes: i64,
}

#[derive(Debug, Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a generated name, keeping the sanitized extension
    /// of the original filename.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let safe = sanitize_file_name(original_name);
        let stored_name = match Path::new(&safe).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(self.root.join(&stored_name), bytes).await?;
        Ok(StoredFile {
            stored_name,
            size_bytes: bytes.len() as i64,
        })
    }

    pub async fn read(&self, stored_name: &str) -> Result<Vec<u8>, StorageError> {
        match tokio::fs::read(self.resolve(stored_name)?).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the stored file. A file already gone is not an error: the
    /// database row is authoritative.
    pub async fn remove(&self, stored_name: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.resolve(stored_name)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored names are generated by `store`; anything with path separators
    /// or parent components is rejected outright.
    fn resolve(&self, stored_name: &str) -> Result<PathBuf, StorageError> {
        if stored_name.is_empty()
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name.contains("..")
        {
            return Err(StorageError::InvalidName);
        }
        Ok(self.root.join(stored_name))
    }
}

/// Keep the basename only, restricted to alphanumerics and a small allow-set
/// of punctuation. Prevents path traversal via the multipart filename header.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("document")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect::<String>();
    let trimmed = base.trim().trim_matches('.');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\temp\\notes.txt"), "notes.txt");
    }

    #[test]
    fn test_sanitize_drops_odd_characters() {
        assert_eq!(sanitize_file_name("ra$p#port 2025.pdf"), "rapport 2025.pdf");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_file_name(""), "document");
        assert_eq!(sanitize_file_name("###"), "document");
    }

    #[tokio::test]
    async fn test_store_read_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path()).await.unwrap();

        let stored = storage.store("report.PDF", b"hello").await.unwrap();
        assert!(stored.stored_name.ends_with(".pdf"));
        assert_eq!(stored.size_bytes, 5);

        let bytes = storage.read(&stored.stored_name).await.unwrap();
        assert_eq!(bytes, b"hello");

        storage.remove(&stored.stored_name).await.unwrap();
        assert!(matches!(
            storage.read(&stored.stored_name).await,
            Err(StorageError::NotFound)
        ));
        // removing twice is fine
        storage.remove(&stored.stored_name).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path()).await.unwrap();
        assert!(matches!(
            storage.read("../outside.txt").await,
            Err(StorageError::InvalidName)
        ));
    }
}
