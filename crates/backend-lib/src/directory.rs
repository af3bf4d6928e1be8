// ============================
// portal-auth/src/directory.rs
// ============================
//! Credential lookup abstraction with flat-file and in-memory implementations.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use portal_common::CredentialRecord;
use thiserror::Error;
use tokio::fs as tokio_fs;
use tracing::debug;

/// Lookup failures. These are transient from the caller's point of view and
/// must never be reported as bad credentials.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the user directory
#[async_trait]
pub trait CredentialDirectory: Send + Sync {
    /// Find the credential record for `identifier`, if the user exists
    async fn find(&self, identifier: &str) -> Result<Option<CredentialRecord>, DirectoryError>;
}

/// Directory backed by a JSON array of credential records.
///
/// The file is re-read on every lookup so edits made by the export job are
/// picked up without a restart.
#[derive(Clone, Debug)]
pub struct FlatFileDirectory {
    path: PathBuf,
}

impl FlatFileDirectory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialDirectory for FlatFileDirectory {
    async fn find(&self, identifier: &str) -> Result<Option<CredentialRecord>, DirectoryError> {
        let content = tokio_fs::read_to_string(&self.path).await?;
        let records: Vec<CredentialRecord> = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), count = records.len(), "loaded credential file");

        Ok(records.into_iter().find(|r| r.identifier == identifier))
    }
}

/// Concurrent in-process directory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    records: DashMap<String, CredentialRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record keyed by its identifier
    pub fn insert(&self, record: CredentialRecord) {
        self.records.insert(record.identifier.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<CredentialRecord> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = CredentialRecord>>(iter: I) -> Self {
        let directory = Self::new();
        for record in iter {
            directory.insert(record);
        }
        directory
    }
}

#[async_trait]
impl CredentialDirectory for InMemoryDirectory {
    async fn find(&self, identifier: &str) -> Result<Option<CredentialRecord>, DirectoryError> {
        Ok(self.records.get(identifier).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(identifier: &str, user_id: i64) -> CredentialRecord {
        CredentialRecord {
            identifier: identifier.to_string(),
            user_id,
            stored_hash: "$P$6abcdefghd6u70gBEMxKaM6FHBTeGv0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let directory: InMemoryDirectory = [record("alex", 1), record("dana", 2)].into_iter().collect();
        assert_eq!(directory.len(), 2);

        let found = directory.find("dana").await.unwrap().unwrap();
        assert_eq!(found.user_id, 2);
        assert!(directory.find("nobody").await.unwrap().is_none());

        directory.insert(record("dana", 9));
        assert_eq!(directory.find("dana").await.unwrap().unwrap().user_id, 9);
    }

    #[tokio::test]
    async fn test_flat_file_lookup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let json = serde_json::to_string_pretty(&vec![record("alex", 1), record("dana", 2)]).unwrap();
        std::fs::write(&path, json).unwrap();

        let directory = FlatFileDirectory::new(&path);
        assert_eq!(directory.find("alex").await.unwrap().unwrap().user_id, 1);
        assert!(directory.find("ALEX").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_flat_file_missing_is_error() {
        let dir = tempdir().unwrap();
        let directory = FlatFileDirectory::new(dir.path().join("missing.json"));
        assert!(matches!(directory.find("alex").await, Err(DirectoryError::Io(_))));
    }

    #[tokio::test]
    async fn test_flat_file_corrupt_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();

        let directory = FlatFileDirectory::new(&path);
        assert!(matches!(directory.find("alex").await, Err(DirectoryError::Json(_))));
    }
}
