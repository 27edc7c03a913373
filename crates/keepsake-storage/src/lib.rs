//! Object-storage abstraction for derived media assets.
//!
//! Assets for a record live under the deterministic key prefix `{id}/`
//! (see [`keys`]); uploads overwrite on conflict, so re-publishing the
//! same path is idempotent, and delete cascades remove the whole prefix.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

use serde::{Deserialize, Serialize};

pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
}
