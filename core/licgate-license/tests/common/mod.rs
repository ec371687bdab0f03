//! Shared test helpers for license tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use licgate_license::{
    DELIMITER, FILLER, LicenseRecord, LicenseRecordStore, MemoryRecordStore, StoreError,
    StoreResult,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Characters per group in a presented license string.
const GROUP_LEN: usize = 4;

/// Builds a presented license string for `<id>:<token>`: base64, padded
/// with filler to a multiple of 8 characters, grouped with the delimiter.
pub fn present(id: &str, token: &str) -> String {
    let mut body = STANDARD.encode(format!("{id}:{token}"));
    let padded_len = body.len().div_ceil(8) * 8 + 8;
    while body.len() < padded_len {
        body.push(FILLER);
    }
    body.as_bytes()
        .chunks(GROUP_LEN)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// Presents an arbitrary payload without the `<id>:<token>` structure.
pub fn present_raw(payload: &str) -> String {
    STANDARD.encode(payload)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Memory store that counts calls and remembers every save.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryRecordStore,
    loads: AtomicUsize,
    saves: Mutex<Vec<LicenseRecord>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: LicenseRecord) -> Self {
        Self {
            inner: MemoryRecordStore::with_record(record),
            ..Self::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> Vec<LicenseRecord> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl LicenseRecordStore for RecordingStore {
    async fn load(&self) -> StoreResult<LicenseRecord> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }

    async fn save(&self, record: &LicenseRecord) -> StoreResult<()> {
        self.saves.lock().unwrap().push(record.clone());
        self.inner.save(record).await
    }
}

/// Store whose every call fails.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl LicenseRecordStore for FailingStore {
    async fn load(&self) -> StoreResult<LicenseRecord> {
        Err(StoreError::Unavailable("host storage offline".into()))
    }

    async fn save(&self, _record: &LicenseRecord) -> StoreResult<()> {
        Err(StoreError::Unavailable("host storage offline".into()))
    }
}

/// Store whose `load` parks until released, to hold a call in flight.
#[derive(Debug, Default)]
pub struct HeldStore {
    pub inner: RecordingStore,
    pub entered: Notify,
    pub release: Notify,
}

impl HeldStore {
    pub fn with_record(record: LicenseRecord) -> Self {
        Self {
            inner: RecordingStore::with_record(record),
            ..Self::default()
        }
    }
}

#[async_trait]
impl LicenseRecordStore for HeldStore {
    async fn load(&self) -> StoreResult<LicenseRecord> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.load().await
    }

    async fn save(&self, record: &LicenseRecord) -> StoreResult<()> {
        self.inner.save(record).await
    }
}

/// Store whose `save` parks until released, to hold a submission in flight.
#[derive(Debug, Default)]
pub struct HeldSaveStore {
    pub inner: MemoryRecordStore,
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl LicenseRecordStore for HeldSaveStore {
    async fn load(&self) -> StoreResult<LicenseRecord> {
        self.inner.load().await
    }

    async fn save(&self, record: &LicenseRecord) -> StoreResult<()> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.save(record).await
    }
}
