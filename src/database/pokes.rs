use async_trait::async_trait;
use serde::Serialize;
use sqlx::{mysql::MySqlRow, MySqlPool, Row};

use super::error::DatabaseError;
use crate::types::{Page, UserId};

/// A row of `Wo_Pokes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Poke {
    pub id: i64,
    pub sender_id: UserId,
    pub receiver_id: UserId,
}

impl Poke {
    fn from_row(row: &MySqlRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            sender_id: UserId(row.try_get("send_user_id")?),
            receiver_id: UserId(row.try_get("received_user_id")?),
        })
    }
}

#[async_trait]
pub trait PokeRepository: Send + Sync {
    /// Pokes received by `user_id`, newest first.
    async fn received(&self, user_id: UserId, page: Page) -> Result<Vec<Poke>, DatabaseError>;

    /// Records a poke. Fails with `Conflict` if `sender` already poked `receiver`.
    async fn poke(&self, sender: UserId, receiver: UserId) -> Result<Poke, DatabaseError>;

    /// Deletes poke `id` only if it was received by `receiver`.
    async fn dismiss(&self, receiver: UserId, id: i64) -> Result<bool, DatabaseError>;
}

pub struct MySqlPokeRepository {
    pool: MySqlPool,
}

impl MySqlPokeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PokeRepository for MySqlPokeRepository {
    async fn received(&self, user_id: UserId, page: Page) -> Result<Vec<Poke>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT CAST(id AS SIGNED) AS id, CAST(send_user_id AS SIGNED) AS send_user_id, \
             CAST(received_user_id AS SIGNED) AS received_user_id \
             FROM Wo_Pokes WHERE received_user_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id.0)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Poke::from_row).collect()
    }

    async fn poke(&self, sender: UserId, receiver: UserId) -> Result<Poke, DatabaseError> {
        // Two identical pokes racing on the same gap lock end in a deadlock
        // for one of them; `DatabaseError::from` reports that as `Conflict`.
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query(
            "SELECT 1 FROM Wo_Pokes WHERE send_user_id = ? AND received_user_id = ? LIMIT 1 FOR UPDATE",
        )
        .bind(sender.0)
        .bind(receiver.0)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(DatabaseError::Conflict(format!("user {} already poked", receiver)));
        }

        let result = sqlx::query("INSERT INTO Wo_Pokes (send_user_id, received_user_id) VALUES (?, ?)")
            .bind(sender.0)
            .bind(receiver.0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Poke {
            id: result.last_insert_id() as i64,
            sender_id: sender,
            receiver_id: receiver,
        })
    }

    async fn dismiss(&self, receiver: UserId, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM Wo_Pokes WHERE id = ? AND received_user_id = ?")
            .bind(id)
            .bind(receiver.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
