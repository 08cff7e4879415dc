//! Persistence of address records.

use async_trait::async_trait;

use crate::address::AddressRecord;
use crate::error::StorageError;

pub mod memory;
pub mod postgres;
#[cfg(test)]
pub(crate) mod testing;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// One page of an ascending scan; `number` starts at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    /// Index of the first record on this page, `None` if it does not fit a `u64`.
    pub fn offset(&self) -> Option<u64> {
        self.number.checked_mul(self.size)
    }
}

/// Storage backend for address records, keyed by address.
///
/// Listings are ascending by address. Every call is its own commit boundary.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Whether any stored address lies in `start..=end`.
    async fn exists_in_range(&self, start: u32, end: u32) -> Result<bool, StorageError>;

    async fn get(&self, address: u32) -> Result<Option<AddressRecord>, StorageError>;

    /// Sets the acquired flag of an already stored address.
    ///
    /// Returns `None` without writing anything when the address is not stored.
    async fn update(&self, record: AddressRecord) -> Result<Option<AddressRecord>, StorageError>;

    /// Inserts new records in a single backend call.
    ///
    /// Fails with [`StorageError::DuplicateAddress`] (or the backend's unique violation)
    /// if any address is already stored; nothing from the failing call is kept.
    async fn insert_batch(&self, records: &[AddressRecord]) -> Result<(), StorageError>;

    async fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError>;

    async fn list_page(&self, page: Page) -> Result<Vec<AddressRecord>, StorageError>;

    async fn count(&self) -> Result<u64, StorageError>;

    async fn delete_all(&self) -> Result<(), StorageError>;
}
