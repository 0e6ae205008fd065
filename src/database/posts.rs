use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::{mysql::MySqlRow, MySqlPool, Row};

use super::error::DatabaseError;
use crate::types::{Page, UserId};

/// The subset of `Wo_Posts` the API exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: i64,
    pub user_id: UserId,
    pub text: String,
    /// Unix seconds.
    pub time: i64,
}

impl Post {
    fn from_row(row: &MySqlRow) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: UserId(row.try_get("user_id")?),
            text: row.try_get::<Option<String>, _>("post_text")?.unwrap_or_default(),
            time: row.try_get("time")?,
        })
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn post_exists(&self, post_id: i64) -> Result<bool, DatabaseError>;

    /// Posts saved by `user_id`, most recently saved first.
    async fn saved_posts(&self, user_id: UserId, page: Page) -> Result<Vec<Post>, DatabaseError>;

    /// Idempotent. Returns `true` when a new save was recorded.
    async fn save_post(&self, user_id: UserId, post_id: i64) -> Result<bool, DatabaseError>;

    /// Returns `false` when the post was not saved by this user.
    async fn unsave_post(&self, user_id: UserId, post_id: i64) -> Result<bool, DatabaseError>;

    /// Posts by `user_id` published on `on`'s month and day in an earlier year.
    async fn memories(&self, user_id: UserId, on: NaiveDate, page: Page) -> Result<Vec<Post>, DatabaseError>;
}

/// True when `time` falls on the same UTC month/day as `on` in a strictly
/// earlier year. The MySQL pool pins its session time zone to UTC so
/// `FROM_UNIXTIME` agrees with this.
pub fn is_memory_of(time: i64, on: NaiveDate) -> bool {
    match chrono::DateTime::from_timestamp(time, 0) {
        Some(dt) => {
            let date = dt.date_naive();
            date.month() == on.month() && date.day() == on.day() && date.year() < on.year()
        }
        None => false,
    }
}

pub struct MySqlPostRepository {
    pool: MySqlPool,
}

impl MySqlPostRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "CAST(p.id AS SIGNED) AS id, CAST(p.user_id AS SIGNED) AS user_id, \
     p.postText AS post_text, CAST(p.time AS SIGNED) AS time";

#[async_trait]
impl PostRepository for MySqlPostRepository {
    async fn post_exists(&self, post_id: i64) -> Result<bool, DatabaseError> {
        let row = sqlx::query("SELECT 1 FROM Wo_Posts WHERE id = ? LIMIT 1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn saved_posts(&self, user_id: UserId, page: Page) -> Result<Vec<Post>, DatabaseError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM Wo_SavedPosts s \
             JOIN Wo_Posts p ON p.id = s.post_id \
             WHERE s.user_id = ? ORDER BY s.id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.0)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Post::from_row).collect()
    }

    async fn save_post(&self, user_id: UserId, post_id: i64) -> Result<bool, DatabaseError> {
        // The legacy table has no unique key on (user_id, post_id). Where one
        // has been added, a racing save surfaces as a duplicate-key conflict
        // and is reported as "already saved".
        let result = sqlx::query(
            "INSERT INTO Wo_SavedPosts (user_id, post_id) \
             SELECT ?, ? FROM DUAL WHERE NOT EXISTS \
             (SELECT 1 FROM Wo_SavedPosts WHERE user_id = ? AND post_id = ?)",
        )
        .bind(user_id.0)
        .bind(post_id)
        .bind(user_id.0)
        .bind(post_id)
        .execute(&self.pool)
        .await;
        match result {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(e) => match DatabaseError::from(e) {
                DatabaseError::Conflict(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn unsave_post(&self, user_id: UserId, post_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM Wo_SavedPosts WHERE user_id = ? AND post_id = ?")
            .bind(user_id.0)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn memories(&self, user_id: UserId, on: NaiveDate, page: Page) -> Result<Vec<Post>, DatabaseError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM Wo_Posts p \
             WHERE p.user_id = ? \
             AND MONTH(FROM_UNIXTIME(p.time)) = ? AND DAY(FROM_UNIXTIME(p.time)) = ? \
             AND YEAR(FROM_UNIXTIME(p.time)) < ? \
             ORDER BY p.time DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.0)
            .bind(on.month())
            .bind(on.day())
            .bind(on.year())
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Post::from_row).collect()
    }
}
