use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use super::error::DatabaseError;
use crate::types::UserId;

/// A row of `Wo_AppsSessions`: an issued login credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub created_at: i64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Persisted mapping from issued tokens to the user that owns them.
///
/// Lookups are read-only: nothing here extends or refreshes a session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn user_id_for_token(&self, token: &str) -> Result<Option<UserId>, DatabaseError>;

    /// Removes a single session. Returns whether a row was deleted.
    async fn delete_token(&self, token: &str) -> Result<bool, DatabaseError>;

    /// Removes every session belonging to `user_id`, returning how many went.
    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, DatabaseError>;

    /// Cheap connectivity probe used by `/health`.
    async fn ping(&self) -> Result<(), DatabaseError>;
}

// Tokens match byte for byte. `Wo_AppsSessions.session_id` carries a
// case-insensitive, pad-space collation, so the plain equality only narrows
// through the index and `BINARY` makes the match exact.
const SELECT_USER_BY_TOKEN: &str = "SELECT CAST(user_id AS SIGNED) AS user_id FROM Wo_AppsSessions \
     WHERE session_id = ? AND BINARY session_id = ? LIMIT 1";
const DELETE_BY_TOKEN: &str =
    "DELETE FROM Wo_AppsSessions WHERE session_id = ? AND BINARY session_id = ?";

pub struct MySqlSessionStore {
    pool: MySqlPool,
}

impl MySqlSessionStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for MySqlSessionStore {
    async fn user_id_for_token(&self, token: &str) -> Result<Option<UserId>, DatabaseError> {
        let row = sqlx::query(SELECT_USER_BY_TOKEN)
            .bind(token)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(UserId(row.try_get("user_id")?))),
            None => Ok(None),
        }
    }

    async fn delete_token(&self, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(DELETE_BY_TOKEN)
            .bind(token)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM Wo_AppsSessions WHERE user_id = ?")
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_queries_compare_bytes() {
        for sql in [SELECT_USER_BY_TOKEN, DELETE_BY_TOKEN] {
            assert!(sql.contains("AND BINARY session_id = ?"), "{sql}");
            assert_eq!(sql.matches('?').count(), 2);
        }
    }
}
