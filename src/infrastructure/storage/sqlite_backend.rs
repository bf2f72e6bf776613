use crate::application::ports::storage_backend::StorageBackend;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, Pool, Row, Sqlite};
use std::str::FromStr;

/// SQLite の `kv_store` テーブルをバックエンドにする実装
pub struct SqliteStorageBackend {
    pool: Pool<Sqlite>,
}

impl SqliteStorageBackend {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // create_if_missing はファイルしか作らない
        if let Some(parent) = options
            .get_filename()
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let backend = Self::new(pool);
        backend.initialize_schema().await?;
        Ok(backend)
    }

    pub async fn initialize_schema(&self) -> Result<(), AppError> {
        self.pool
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                )
                "#,
            )
            .await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl StorageBackend for SqliteStorageBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => Some(row.try_get::<String, _>("value")?),
            None => None,
        })
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_backend() -> SqliteStorageBackend {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let backend = SqliteStorageBackend::new(pool);
        backend.initialize_schema().await.unwrap();
        backend
    }

    #[tokio::test]
    async fn upsert_overwrites_previous_value() {
        let backend = setup_backend().await;

        backend.set_item("pending_operations", "[]").await.unwrap();
        backend
            .set_item("pending_operations", r#"[{"id":"x"}]"#)
            .await
            .unwrap();

        assert_eq!(
            backend.get_item("pending_operations").await.unwrap().as_deref(),
            Some(r#"[{"id":"x"}]"#)
        );

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_store")
            .fetch_one(backend.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let backend = setup_backend().await;

        backend.remove_item("missing").await.unwrap();
        backend.set_item("last_sync", "1").await.unwrap();
        backend.remove_item("last_sync").await.unwrap();
        backend.remove_item("last_sync").await.unwrap();

        assert_eq!(backend.get_item("last_sync").await.unwrap(), None);
    }

    #[tokio::test]
    async fn connect_creates_database_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offline.db");
        let url = format!("sqlite://{}", path.display());

        let backend = SqliteStorageBackend::connect(&url).await.unwrap();
        backend.set_item("offline_cart", "[]").await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn connect_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh").join("install").join("offline.db");
        let url = format!("sqlite://{}", path.display());

        let backend = SqliteStorageBackend::connect(&url).await.unwrap();
        backend.set_item("last_sync", "1").await.unwrap();

        assert!(path.exists());
    }
}
