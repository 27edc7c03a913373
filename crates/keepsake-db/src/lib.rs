//! Row-store layer.
//!
//! The store guarantees exactly four columns per record: `id`, `title`,
//! `description` (free text) and `created_at`. [`RecordRepository`] speaks
//! that schema; [`RecordStore`] layers the metadata codec on top so callers
//! read and write full [`keepsake_core::MediaRecord`]s.

pub mod records;
pub mod store;

pub use records::{connect, RecordRepository, RecordRow, StoreError};
pub use store::RecordStore;
