//! File-backed session identity.
//!
//! Free-standing chat sessions are anonymous: the id is minted on first use
//! and kept in a small file under the platform data directory, so the same
//! conversation resumes across runs.  Document-referenced sessions use the
//! document id directly and never touch this store.

use std::fs;
use std::path::PathBuf;

use tracing::debug;
use uuid::Uuid;

use crate::error::ClientError;

pub struct SessionIdStore {
    path: PathBuf,
}

impl SessionIdStore {
    /// Store rooted at the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join("session-id"),
        }
    }

    /// Platform default data directory for docchat, when the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs_next::data_dir().map(|d| d.join("docchat"))
    }

    /// Return the stored id, minting and persisting a fresh one on first use
    /// (or when the file was emptied by hand).
    pub fn load_or_create(&self) -> Result<String, ClientError> {
        if let Ok(existing) = fs::read_to_string(&self.path) {
            let trimmed = existing.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_owned());
            }
        }
        self.reset()
    }

    /// Mint a new session id, replacing any stored one.
    pub fn reset(&self) -> Result<String, ClientError> {
        let id = Uuid::new_v4().to_string();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &id)?;
        debug!(path = %self.path.display(), "session id written");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_use_mints_and_persists_an_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionIdStore::new(dir.path());

        let first = store.load_or_create().unwrap();
        let second = store.load_or_create().unwrap();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn reset_replaces_the_stored_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionIdStore::new(dir.path());

        let first = store.load_or_create().unwrap();
        let fresh = store.reset().unwrap();
        assert_ne!(first, fresh);
        assert_eq!(store.load_or_create().unwrap(), fresh);
    }

    #[test]
    fn emptied_file_is_treated_as_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionIdStore::new(dir.path());

        store.load_or_create().unwrap();
        fs::write(dir.path().join("session-id"), "  \n").unwrap();
        let minted = store.load_or_create().unwrap();
        assert!(Uuid::parse_str(&minted).is_ok());
    }
}
