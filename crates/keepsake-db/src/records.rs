use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use uuid::Uuid;

/// Row-store operation errors. A failed write is fatal to the caller's
/// save; callers are expected to retain in-progress state rather than
/// discard it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Raw row as the store guarantees it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

impl RecordRow {
    pub fn parsed_id(&self) -> Result<Uuid, StoreError> {
        Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Corrupt(format!("bad record id {}: {}", self.id, e)))
    }

    pub fn parsed_created_at(&self) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                StoreError::Corrupt(format!("bad created_at {}: {}", self.created_at, e))
            })
    }
}

/// Open (or create) the SQLite database and ensure the schema exists.
pub async fn connect(database_path: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    RecordRepository::migrate(&pool).await?;
    Ok(pool)
}

/// Repository for the records table.
///
/// Writes are unconditional overwrite-by-id (last write wins); there is no
/// optimistic versioning or conflict detection.
#[derive(Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
}

impl RecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the schema if missing. Timestamps are stored as fixed-width
    /// RFC 3339 UTC text so lexicographic order is chronological order.
    pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Insert or overwrite a record row.
    #[tracing::instrument(skip(self, title, description), fields(db.table = "records", db.operation = "upsert", db.record_id = %id))]
    pub async fn upsert(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO records (id, title, description, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                created_at = excluded.created_at
            "#,
        )
        .bind(id.to_string())
        .bind(title)
        .bind(description)
        .bind(created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch one row by id.
    #[tracing::instrument(skip(self), fields(db.table = "records", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<RecordRow>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, title, description, created_at FROM records WHERE id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All rows, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "records", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<RecordRow>, StoreError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT id, title, description, created_at FROM records ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete one row; returns whether a row existed.
    #[tracing::instrument(skip(self), fields(db.table = "records", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
