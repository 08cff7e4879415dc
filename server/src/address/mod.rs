//! The address-range engine: CIDR expansion, overlap detection and batched
//! materialization of address records, plus the acquire/release operations built on it.

pub mod cidr;
pub mod codec;
pub mod materializer;
pub mod overlap;
pub mod record;
pub mod service;

pub use materializer::BatchSize;
pub use record::{AddressRange, AddressRecord};
pub use service::AddressService;
