//! Persistence seam for the license record.
//!
//! The session only ever talks to [`LicenseRecordStore`]. Two
//! implementations ship with the crate: an in-memory store for tests and
//! embedding, and a JSON file store for the desktop shell.

use crate::error::StoreResult;
use crate::record::LicenseRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Host key-value storage for the single license record.
#[async_trait]
pub trait LicenseRecordStore: Send + Sync {
    /// Returns the last saved record, or the empty record if none exists.
    async fn load(&self) -> StoreResult<LicenseRecord>;

    /// Replaces the saved record. Saving [`LicenseRecord::cleared`] clears it.
    ///
    /// A concurrent `load` observes either the old or the new record, never
    /// a mix of both.
    async fn save(&self, record: &LicenseRecord) -> StoreResult<()>;
}

/// Store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    record: RwLock<LicenseRecord>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `record`.
    #[must_use]
    pub fn with_record(record: LicenseRecord) -> Self {
        Self {
            record: RwLock::new(record),
        }
    }
}

#[async_trait]
impl LicenseRecordStore for MemoryRecordStore {
    async fn load(&self) -> StoreResult<LicenseRecord> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, record: &LicenseRecord) -> StoreResult<()> {
        *self.record.write().await = record.clone();
        Ok(())
    }
}

/// Store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    /// File name used under the default location.
    pub const FILE_NAME: &'static str = "license.json";

    /// Creates a store reading and writing `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/licgate/license.json`, if the platform has a config dir.
    #[must_use]
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("licgate").join(Self::FILE_NAME))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| Self::FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LicenseRecordStore for FileRecordStore {
    async fn load(&self) -> StoreResult<LicenseRecord> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LicenseRecord::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, record: &LicenseRecord) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write aside, then rename over the target so readers never see a partial file.
        let json = serde_json::to_vec_pretty(record)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
