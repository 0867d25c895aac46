//! Storage infrastructure - Record store implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryRecordStore;
pub use postgres::{PostgresConfig, PostgresRecordStore};
