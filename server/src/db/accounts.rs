use super::DB;
use crate::error::{ApiError, ApiResult};
use crate::models::account::Account;
use chrono::Utc;

/// Thin wrapper over the `usuarios` table.
#[derive(Clone)]
pub struct AccountStore {
    db: DB,
}

impl AccountStore {
    pub fn new(db: DB) -> Self {
        Self { db }
    }

    /// Exact, case-sensitive lookup.
    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, usuario AS username, password_hash, fecha_registro AS created_at \
             FROM usuarios WHERE usuario = ?",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    /// Inserts a new account. The UNIQUE constraint on `usuario` is the only
    /// guard that matters under concurrency: the loser of a race gets
    /// `UsernameTaken`, never a second row.
    pub async fn insert(&self, username: &str, password_hash: &str) -> ApiResult<Account> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO usuarios (usuario, password_hash, fecha_registro) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ApiError::UsernameTaken
            }
            other => ApiError::Database(other),
        })?;

        Ok(Account {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    pub async fn count(&self) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    /// `SELECT 1` round trip, used by `/status`.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db).await.is_ok()
    }
}
