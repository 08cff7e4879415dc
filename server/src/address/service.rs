use std::sync::Arc;

use tracing::{debug, info};

use crate::address::materializer::{materialize, BatchSize};
use crate::address::{cidr, codec, overlap, AddressRecord};
use crate::error::{AddressError, Result};
use crate::store::{AddressStore, Page};

/// Address operations exposed to the HTTP layer.
pub struct AddressService<S: ?Sized> {
    store: Arc<S>,
    batch_size: BatchSize,
}

impl<S: ?Sized> Clone for AddressService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), batch_size: self.batch_size }
    }
}

impl<S: AddressStore + ?Sized> AddressService<S> {
    pub fn new(store: Arc<S>, batch_size: BatchSize) -> Self {
        Self { store, batch_size }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Marks `address` acquired. Acquiring an acquired address returns it without a write.
    pub async fn acquire(&self, address: &str) -> Result<AddressRecord> {
        self.set_acquired(address, true).await
    }

    /// Marks `address` released. Releasing a released address returns it without a write.
    pub async fn release(&self, address: &str) -> Result<AddressRecord> {
        self.set_acquired(address, false).await
    }

    async fn set_acquired(&self, address: &str, acquired: bool) -> Result<AddressRecord> {
        let record = self
            .get(address)
            .await?
            .ok_or_else(|| AddressError::NotFound(format!("address {address} not found")))?;

        if record.acquired == acquired {
            debug!(%address, acquired, "address already in requested state");
            return Ok(record);
        }
        // the record may have been deleted since the lookup
        let updated = self
            .store
            .update(record.with_acquired(acquired))
            .await?
            .ok_or_else(|| AddressError::NotFound(format!("address {address} not found")))?;
        info!(%address, acquired, "address state changed");
        Ok(updated)
    }

    pub async fn get(&self, address: &str) -> Result<Option<AddressRecord>> {
        let address = codec::decode(address)?;
        Ok(self.store.get(address).await?)
    }

    /// Registers every address of `network_address/mask_bits` and returns how many there are.
    ///
    /// Fails with [`AddressError::Overlap`] before writing anything if any address of the
    /// block is already registered.
    pub async fn add_block(&self, network_address: &str, mask_bits: i64) -> Result<u64> {
        let range = cidr::expand(network_address, mask_bits)?;
        if overlap::overlaps(self.store.as_ref(), range).await? {
            return Err(AddressError::Overlap(format!(
                "CIDR block {network_address}/{mask_bits} overlaps existing addresses"
            )));
        }
        materialize(self.store.as_ref(), range, self.batch_size).await
    }

    pub async fn list_all(&self) -> Result<Vec<AddressRecord>> {
        Ok(self.store.list_all().await?)
    }

    /// Page `page_num` (from 0) of `page_size` records, ascending.
    pub async fn list_page(&self, page_num: u64, page_size: u64) -> Result<Vec<AddressRecord>> {
        if page_size == 0 {
            return Err(AddressError::InvalidPage("page size must not be less than one".to_string()));
        }
        let page = Page { number: page_num, size: page_size };
        if page.offset().is_none() {
            return Err(AddressError::InvalidPage(format!(
                "page {page_num} of size {page_size} is out of range"
            )));
        }
        Ok(self.store.list_page(page).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.store.count().await?)
    }

    pub async fn delete_all(&self) -> Result<()> {
        self.store.delete_all().await?;
        info!("deleted all addresses");
        Ok(())
    }
}
