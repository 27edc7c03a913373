use crate::{LocalStorage, Storage, StorageResult};
use keepsake_core::AppConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration.
///
/// Only the local backend ships today; the factory keeps the seam so a
/// remote object store can slot in behind the same trait.
pub async fn create_storage(config: &AppConfig) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(
        config.storage_root.clone(),
        config.storage_base_url.clone(),
    )
    .await?;
    Ok(Arc::new(storage))
}
