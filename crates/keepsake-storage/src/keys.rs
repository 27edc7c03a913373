//! Shared key generation for storage backends.
//!
//! The path scheme is deterministic per record: everything for a record
//! lives under `{id}/`, which is what makes the delete cascade a single
//! prefix removal.

use uuid::Uuid;

/// Poster asset key: `{id}/poster`.
pub fn poster_key(record_id: Uuid) -> String {
    format!("{}/poster", record_id)
}

/// Primary media key: `{id}/main.{ext}`.
pub fn main_key(record_id: Uuid, extension: &str) -> String {
    format!("{}/main.{}", record_id, extension)
}

/// Secondary page key: `{id}/page_{n}_{digest}`.
///
/// The content digest disambiguates pages across reorders without
/// collision, and makes re-uploading identical content land on the same
/// key (idempotent overwrite).
pub fn page_key(record_id: Uuid, index: usize, digest: &str) -> String {
    format!("{}/page_{}_{}", record_id, index, digest)
}

/// Prefix covering every asset of a record: `{id}/`.
pub fn record_prefix(record_id: Uuid) -> String {
    format!("{}/", record_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_share_record_prefix() {
        let id = Uuid::new_v4();
        let prefix = record_prefix(id);
        assert!(poster_key(id).starts_with(&prefix));
        assert!(main_key(id, "mp4").starts_with(&prefix));
        assert!(page_key(id, 0, "aa11bb22").starts_with(&prefix));
    }

    #[test]
    fn test_page_key_shape() {
        let id = Uuid::new_v4();
        assert_eq!(
            page_key(id, 2, "deadbeef"),
            format!("{}/page_2_deadbeef", id)
        );
    }
}
