//! Codec-backed record store: encode on write, decode on read.

use keepsake_core::codec::{self, RecordAttrs};
use keepsake_core::MediaRecord;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::records::{RecordRepository, RecordRow, StoreError};

/// Store for full [`MediaRecord`]s over the four-column row contract.
#[derive(Clone)]
pub struct RecordStore {
    repo: RecordRepository,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: RecordRepository::new(pool),
        }
    }

    /// Persist a record; everything beyond the guaranteed columns is
    /// packed into the description field by the codec.
    pub async fn save(&self, record: &MediaRecord) -> Result<(), StoreError> {
        let encoded = codec::encode(&RecordAttrs::from(record));
        self.repo
            .upsert(record.id, &record.title, &encoded, record.created_at)
            .await
    }

    pub async fn load(&self, id: Uuid) -> Result<Option<MediaRecord>, StoreError> {
        match self.repo.get(id).await? {
            Some(row) => Ok(Some(decode_row(row)?)),
            None => Ok(None),
        }
    }

    /// All records, newest first. Decoding never fails; rows written by
    /// older schemes or by hand fall back to defaulted structure.
    pub async fn load_all(&self) -> Result<Vec<MediaRecord>, StoreError> {
        self.repo
            .list_all()
            .await?
            .into_iter()
            .map(decode_row)
            .collect()
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.repo.delete(id).await
    }

    pub fn repository(&self) -> RecordRepository {
        self.repo.clone()
    }
}

fn decode_row(row: RecordRow) -> Result<MediaRecord, StoreError> {
    let id = row.parsed_id()?;
    let created_at = row.parsed_created_at()?;
    Ok(codec::decode(&row.description).into_record(id, row.title, created_at))
}
