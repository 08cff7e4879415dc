//! IPv4 address inventory.
//!
//! CIDR blocks are registered as individually tracked addresses which can then be
//! acquired and released. [`address::AddressService`] carries the operations,
//! [`store::AddressStore`] abstracts persistence and [`server`] exposes both over HTTP.

pub mod address;
pub mod error;
pub mod logger;
pub mod server;
pub mod server_config;
pub mod set_up;
pub mod store;

pub use address::{AddressRange, AddressRecord, AddressService, BatchSize};
pub use error::{AddressError, StorageError};
pub use server::create_router;
pub use store::{AddressStore, MemoryStore, PostgresStore};
