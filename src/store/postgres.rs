//! PostgreSQL key store.
//!
//! Every query names its columns explicitly so that the row shape is checked
//! against [`ApiKey`] instead of passing through whatever the table holds.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::api_key::{ApiKey, NewApiKey, trim_name};
use crate::store::KeyStore;

/// Unique index on `lower(btrim(name, E' \t\r\n'))`, see the `create_api_keys` migration.
const NAME_UNIQUE_INDEX: &str = "api_keys_name_unique";

/// Key store backed by the `api_keys` table.
#[derive(Debug, Clone)]
pub struct PgKeyStore {
    pool: DbPool,
}

impl PgKeyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a failed write into the application error taxonomy.
///
/// A violation of the name index means a concurrent writer won the race after
/// our pre-check; it is reported exactly like the pre-check would.
fn map_write_error(err: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(NAME_UNIQUE_INDEX) {
            return AppError::DuplicateName(trim_name(name).to_string());
        }
        if db_err.is_check_violation() {
            return AppError::InvalidRequest(format!("Rejected by the key store: {}", db_err));
        }
    }
    AppError::from(err)
}

#[async_trait]
impl KeyStore for PgKeyStore {
    async fn list(&self) -> Result<Vec<ApiKey>, AppError> {
        let keys = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, name, key, monthly_limit, current_usage, created_at
            FROM api_keys
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn insert(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (name, key, monthly_limit, current_usage)
            VALUES ($1, $2, $3, 0)
            RETURNING id, name, key, monthly_limit, current_usage, created_at
            "#,
        )
        .bind(&new_key.name)
        .bind(&new_key.secret)
        .bind(new_key.monthly_limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_write_error(err, &new_key.name))
    }

    async fn find_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, AppError> {
        let key = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, name, key, monthly_limit, current_usage, created_at
            FROM api_keys
            WHERE key = $1
            "#,
        )
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<ApiKey>, AppError> {
        sqlx::query_as::<_, ApiKey>(
            r#"
            UPDATE api_keys
            SET name = $1
            WHERE id = $2
            RETURNING id, name, key, monthly_limit, current_usage, created_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| map_write_error(err, name))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
