//! Store Client Module
//!
//! The contract this crate consumes from an external key-value/sorted-set store,
//! plus the two implementations shipped with it.
//!
//! ## Submodules
//! - **`client`**: The `StoreClient` async trait and its argument/result types.
//! - **`memory`**: `MemoryStore`, an in-process store with Redis-compatible semantics.
//! - **`redis_store`**: `RedisStore`, the same contract over a Redis connection.
//! - **`error`**: `StoreError`, the failure taxonomy of every store call.

pub mod client;
pub mod error;
pub mod memory;
pub mod redis_store;

pub use client::{KeyScan, ScoredMember, StoreClient, ValueKind};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[cfg(test)]
mod tests;
