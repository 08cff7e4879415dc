//! Turns a registered range into stored address records, one bounded batch at a time.
//!
//! Batches are flushed as separate store calls so a large block never has to fit in
//! memory or in a single transaction. The flip side is that a failure part-way through
//! leaves the batches already flushed in place.

use std::fmt;
use std::num::NonZeroUsize;

use tracing::{debug, info};

use crate::address::{AddressRange, AddressRecord};
use crate::error::Result;
use crate::store::AddressStore;

/// Maximum number of records written per store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    pub const ONE: BatchSize = BatchSize(NonZeroUsize::MIN);

    pub fn new(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self)
    }

    /// Reads a configured value; missing, non-positive or unparsable settings give one
    /// record per batch.
    pub fn from_setting(setting: Option<&str>) -> Self {
        setting
            .and_then(|s| s.trim().parse::<usize>().ok())
            .and_then(Self::new)
            .unwrap_or(Self::ONE)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stores a released record for every address in `range`, ascending, in batches of at
/// most `batch_size`. Returns the number of addresses in the range.
///
/// The first failing flush is returned as is; earlier batches stay committed.
pub async fn materialize<S: AddressStore + ?Sized>(
    store: &S,
    range: AddressRange,
    batch_size: BatchSize,
) -> Result<u64> {
    let total = range.len();
    let capacity = usize::try_from(total).map_or(batch_size.get(), |t| t.min(batch_size.get()));
    let mut batch = Vec::with_capacity(capacity);
    let mut flushed = 0u64;

    for address in range.addresses() {
        batch.push(AddressRecord::new(address));
        if batch.len() == batch_size.get() || address == range.end() {
            store.insert_batch(&batch).await?;
            flushed += batch.len() as u64;
            debug!(range = %range, flushed, total, "flushed address batch");
            batch.clear();
        }
    }

    info!(range = %range, total, batch_size = %batch_size, "materialized address range");
    Ok(total)
}
