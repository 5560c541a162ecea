//! Adapters behind the domain ports: record stores and randomness sources.

pub mod in_memory;
pub mod random;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
