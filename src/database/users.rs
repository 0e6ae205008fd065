use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, Row};

use super::error::DatabaseError;
use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub name: String,
}

/// Social network fields stored on `Wo_Users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialLinks {
    pub facebook: String,
    pub twitter: String,
    pub google: String,
    pub instagram: String,
    pub linkedin: String,
    pub youtube: String,
    pub vk: String,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialLinksUpdate {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub google: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub youtube: Option<String>,
    pub vk: Option<String>,
}

impl SocialLinksUpdate {
    /// `(column, value)` pairs for the fields that are set.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("facebook", &self.facebook),
            ("twitter", &self.twitter),
            ("google", &self.google),
            ("instagram", &self.instagram),
            ("linkedin", &self.linkedin),
            ("youtube", &self.youtube),
            ("vk", &self.vk),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }

    pub fn apply_to(&self, links: &mut SocialLinks) {
        for (column, value) in self.fields() {
            let slot = match column {
                "facebook" => &mut links.facebook,
                "twitter" => &mut links.twitter,
                "google" => &mut links.google,
                "instagram" => &mut links.instagram,
                "linkedin" => &mut links.linkedin,
                "youtube" => &mut links.youtube,
                _ => &mut links.vk,
            };
            *slot = value.to_string();
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, DatabaseError>;

    async fn social_links(&self, user_id: UserId) -> Result<Option<SocialLinks>, DatabaseError>;

    async fn update_social_links(
        &self,
        user_id: UserId,
        update: &SocialLinksUpdate,
    ) -> Result<SocialLinks, DatabaseError>;

    /// Removes the user together with their sessions, saved posts and pokes.
    /// Returns `false` when the user did not exist.
    async fn delete_account(&self, user_id: UserId) -> Result<bool, DatabaseError>;
}

pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, DatabaseError> {
        let row = sqlx::query(
            "SELECT CAST(user_id AS SIGNED) AS user_id, username, first_name, last_name \
             FROM Wo_Users WHERE user_id = ? LIMIT 1",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let username: String = row.try_get("username")?;
        let first: Option<String> = row.try_get("first_name")?;
        let last: Option<String> = row.try_get("last_name")?;
        let name = [first.unwrap_or_default(), last.unwrap_or_default()]
            .join(" ")
            .trim()
            .to_string();

        Ok(Some(UserProfile {
            id: UserId(row.try_get("user_id")?),
            name: if name.is_empty() { username.clone() } else { name },
            username,
        }))
    }

    async fn social_links(&self, user_id: UserId) -> Result<Option<SocialLinks>, DatabaseError> {
        let row = sqlx::query(
            "SELECT facebook, twitter, google, instagram, linkedin, youtube, vk \
             FROM Wo_Users WHERE user_id = ? LIMIT 1",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let get = |column: &str| -> Result<String, DatabaseError> {
            Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
        };
        Ok(Some(SocialLinks {
            facebook: get("facebook")?,
            twitter: get("twitter")?,
            google: get("google")?,
            instagram: get("instagram")?,
            linkedin: get("linkedin")?,
            youtube: get("youtube")?,
            vk: get("vk")?,
        }))
    }

    async fn update_social_links(
        &self,
        user_id: UserId,
        update: &SocialLinksUpdate,
    ) -> Result<SocialLinks, DatabaseError> {
        let fields = update.fields();
        if !fields.is_empty() {
            // Column names come from the fixed list in `SocialLinksUpdate::fields`.
            let assignments = fields
                .iter()
                .map(|(column, _)| format!("{column} = ?"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("UPDATE Wo_Users SET {assignments} WHERE user_id = ?");

            let mut query = sqlx::query(&sql);
            for (_, value) in &fields {
                query = query.bind(*value);
            }
            query.bind(user_id.0).execute(&self.pool).await?;
        }

        self.social_links(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {user_id}")))
    }

    async fn delete_account(&self, user_id: UserId) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM Wo_AppsSessions WHERE user_id = ?")
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM Wo_SavedPosts WHERE user_id = ?")
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM Wo_Pokes WHERE send_user_id = ? OR received_user_id = ?")
            .bind(user_id.0)
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM Wo_Users WHERE user_id = ?")
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}
