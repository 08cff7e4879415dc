use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::address::AddressRecord;
use crate::error::StorageError;
use crate::store::{AddressStore, MemoryStore, Page};

const UNAVAILABLE_AFTER: Duration = Duration::from_secs(30);

/// Memory store that records writes and can fail a chosen batch.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    batch_sizes: Mutex<Vec<usize>>,
    updates: AtomicUsize,
    fail_batch: Option<usize>,
    clear_before_update: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `n`th `insert_batch` call (0-based) with a timeout.
    pub fn failing_batch(n: usize) -> Self {
        Self { fail_batch: Some(n), ..Self::default() }
    }

    /// Deletes every record just before each `update`, as a concurrent delete-all would.
    pub fn clearing_before_update() -> Self {
        Self { clear_before_update: true, ..Self::default() }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressStore for RecordingStore {
    async fn exists_in_range(&self, start: u32, end: u32) -> Result<bool, StorageError> {
        self.inner.exists_in_range(start, end).await
    }

    async fn get(&self, address: u32) -> Result<Option<AddressRecord>, StorageError> {
        self.inner.get(address).await
    }

    async fn update(&self, record: AddressRecord) -> Result<Option<AddressRecord>, StorageError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.clear_before_update {
            self.inner.delete_all().await?;
        }
        self.inner.update(record).await
    }

    async fn insert_batch(&self, records: &[AddressRecord]) -> Result<(), StorageError> {
        let call = {
            let mut sizes = self.batch_sizes.lock().unwrap();
            sizes.push(records.len());
            sizes.len() - 1
        };
        if self.fail_batch == Some(call) {
            return Err(StorageError::Timeout(UNAVAILABLE_AFTER));
        }
        self.inner.insert_batch(records).await
    }

    async fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError> {
        self.inner.list_all().await
    }

    async fn list_page(&self, page: Page) -> Result<Vec<AddressRecord>, StorageError> {
        self.inner.list_page(page).await
    }

    async fn count(&self) -> Result<u64, StorageError> {
        self.inner.count().await
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        self.inner.delete_all().await
    }
}

/// Store whose every call times out, as if the database were unreachable.
pub struct UnavailableStore;

#[async_trait]
impl AddressStore for UnavailableStore {
    async fn exists_in_range(&self, _start: u32, _end: u32) -> Result<bool, StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }

    async fn get(&self, _address: u32) -> Result<Option<AddressRecord>, StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }

    async fn update(&self, _record: AddressRecord) -> Result<Option<AddressRecord>, StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }

    async fn insert_batch(&self, _records: &[AddressRecord]) -> Result<(), StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }

    async fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }

    async fn list_page(&self, _page: Page) -> Result<Vec<AddressRecord>, StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        Err(StorageError::Timeout(UNAVAILABLE_AFTER))
    }
}
