use crate::address::AddressRange;
use crate::error::Result;
use crate::store::AddressStore;

/// Whether any registered address falls inside `range`.
///
/// One range-existence query; the answer can go stale before the caller writes.
pub async fn overlaps<S: AddressStore + ?Sized>(store: &S, range: AddressRange) -> Result<bool> {
    Ok(store.exists_in_range(range.start(), range.end()).await?)
}
