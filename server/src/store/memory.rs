use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::address::AddressRecord;
use crate::error::StorageError;
use crate::store::{AddressStore, Page};

/// Process-local store, ordered by address.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<u32, bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_record((address, acquired): (&u32, &bool)) -> AddressRecord {
    AddressRecord { address: *address, acquired: *acquired }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn exists_in_range(&self, start: u32, end: u32) -> Result<bool, StorageError> {
        if start > end {
            return Ok(false);
        }
        Ok(self.records.read().await.range(start..=end).next().is_some())
    }

    async fn get(&self, address: u32) -> Result<Option<AddressRecord>, StorageError> {
        Ok(self
            .records
            .read()
            .await
            .get(&address)
            .map(|acquired| AddressRecord { address, acquired: *acquired }))
    }

    async fn update(&self, record: AddressRecord) -> Result<Option<AddressRecord>, StorageError> {
        let mut stored = self.records.write().await;
        let Some(acquired) = stored.get_mut(&record.address) else {
            return Ok(None);
        };
        *acquired = record.acquired;
        Ok(Some(record))
    }

    async fn insert_batch(&self, records: &[AddressRecord]) -> Result<(), StorageError> {
        let mut stored = self.records.write().await;
        // validate the whole batch first so a rejected call leaves nothing behind
        let mut seen = std::collections::BTreeSet::new();
        for record in records {
            if stored.contains_key(&record.address) || !seen.insert(record.address) {
                return Err(StorageError::DuplicateAddress(record.address));
            }
        }
        stored.extend(records.iter().map(|r| (r.address, r.acquired)));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError> {
        Ok(self.records.read().await.iter().map(to_record).collect())
    }

    async fn list_page(&self, page: Page) -> Result<Vec<AddressRecord>, StorageError> {
        let Some(offset) = page.offset().and_then(|o| usize::try_from(o).ok()) else {
            return Ok(Vec::new());
        };
        let size = usize::try_from(page.size).unwrap_or(usize::MAX);
        Ok(self
            .records
            .read()
            .await
            .iter()
            .skip(offset)
            .take(size)
            .map(to_record)
            .collect())
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        self.records.write().await.clear();
        Ok(())
    }
}
