use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{reject_empty, SecretStore, StoreError, StoreResult};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS secrets (
        name TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

/// Token stored as one row of a sqlite `secrets` table.
///
/// The table is created lazily on first access. `CREATE TABLE IF NOT EXISTS`
/// makes concurrent first accesses harmless. Writes are a single upsert
/// statement, so readers see either the old or the new row.
pub struct SqliteTokenStore {
    pool: SqlitePool,
    key: String,
    schema: OnceCell<()>,
}

impl SqliteTokenStore {
    /// Connect using an sqlx connection string, creating the database file
    /// and its parent directory if missing.
    pub async fn connect(url: &str, key: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        Self::open(options, key).await
    }

    pub async fn open(options: SqliteConnectOptions, key: &str) -> StoreResult<Self> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        let filename = options.get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() && filename.as_os_str() != ":memory:" {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!("Sqlite token store connected");

        Ok(Self::from_pool(pool, key))
    }

    pub fn from_pool(pool: SqlitePool, key: &str) -> Self {
        Self {
            pool,
            key: key.to_string(),
            schema: OnceCell::new(),
        }
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
                debug!("Ensured secrets table exists");
                Ok::<(), sqlx::Error>(())
            })
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTokenStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretStore for SqliteTokenStore {
    async fn get(&self) -> StoreResult<Option<String>> {
        self.ensure_schema().await?;

        let value = sqlx::query_scalar::<_, String>("SELECT value FROM secrets WHERE name = ?")
            .bind(&self.key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.filter(|v| !v.is_empty()))
    }

    async fn set(&self, value: &str) -> StoreResult<()> {
        reject_empty(value)?;
        self.ensure_schema().await?;

        sqlx::query(
            r#"
            INSERT INTO secrets (name, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
