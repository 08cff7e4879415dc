use std::fmt;

use crate::address::codec;

/// A single tracked IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressRecord {
    pub address: u32,
    pub acquired: bool,
}

impl AddressRecord {
    /// A freshly registered, released address.
    pub fn new(address: u32) -> Self {
        Self { address, acquired: false }
    }

    pub fn with_acquired(self, acquired: bool) -> Self {
        Self { acquired, ..self }
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{address={}, acquired={}}}", codec::encode(self.address), self.acquired)
    }
}

/// Inclusive range of addresses covered by a CIDR block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: u32,
    end: u32,
}

// Never empty: `new` guarantees start <= end.
#[allow(clippy::len_without_is_empty)]
impl AddressRange {
    /// Returns `None` when `start > end`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of addresses in the range. A /0 block holds 2^32 addresses, hence `u64`.
    pub fn len(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    pub fn addresses(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} - {}]", codec::encode(self.start), codec::encode(self.end))
    }
}
