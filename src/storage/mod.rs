//! Durable Storage Module
//!
//! Defines the key-value storage contract consumed by every cache, plus an
//! in-process reference implementation.
//!
//! The platform's persistent storage primitive is an external collaborator;
//! the only guarantees assumed are per-key atomicity and string keys/values.

mod memory;

pub use memory::MemoryKvStore;

use async_trait::async_trait;

use crate::error::Result;

// == KV Store Trait ==
/// Asynchronous durable key-value storage over string keys and values.
///
/// Implementations wrap whatever the host platform provides (a settings
/// store, a file-backed map, an embedded database). Each cache owns its
/// storage keys exclusively; no cross-key consistency is assumed.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`, if any.
    async fn remove(&self, key: &str) -> Result<()>;
}
