// In-process implementation of every repository trait, used by the test
// suite and by `--in-memory` local runs.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::error::DatabaseError;
use super::pokes::{Poke, PokeRepository};
use super::posts::{is_memory_of, Post, PostRepository};
use super::sessions::{Session, SessionStore};
use super::users::{SocialLinks, SocialLinksUpdate, UserProfile, UserRepository};
use crate::types::{Page, UserId};

#[derive(Debug, Clone)]
struct StoredUser {
    username: String,
    name: String,
    links: SocialLinks,
}

#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<String, Session>,
    users: BTreeMap<UserId, StoredUser>,
    posts: BTreeMap<i64, Post>,
    // (row id, user_id, post_id)
    saved: Vec<(i64, UserId, i64)>,
    pokes: Vec<Poke>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn paginate<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user_id: UserId, username: &str) {
        self.tables.write().await.users.insert(
            user_id,
            StoredUser {
                username: username.to_string(),
                name: username.to_string(),
                links: SocialLinks::default(),
            },
        );
    }

    pub async fn insert_session(&self, token: &str, user_id: UserId) {
        let created_at = chrono::Utc::now().timestamp();
        self.tables.write().await.sessions.insert(
            token.to_string(),
            Session {
                token: token.to_string(),
                user_id,
                created_at,
            },
        );
    }

    /// Inserts a post and returns its id.
    pub async fn insert_post(&self, user_id: UserId, text: &str, time: i64) -> i64 {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.posts.insert(
            id,
            Post {
                id,
                user_id,
                text: text.to_string(),
                time,
            },
        );
        id
    }

    pub async fn session(&self, token: &str) -> Option<Session> {
        self.tables.read().await.sessions.get(token).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    pub async fn user_exists(&self, user_id: UserId) -> bool {
        self.tables.read().await.users.contains_key(&user_id)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn user_id_for_token(&self, token: &str) -> Result<Option<UserId>, DatabaseError> {
        Ok(self.tables.read().await.sessions.get(token).map(|s| s.user_id))
    }

    async fn delete_token(&self, token: &str) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.sessions.remove(token).is_some())
    }

    async fn delete_for_user(&self, user_id: UserId) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn post_exists(&self, post_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.read().await.posts.contains_key(&post_id))
    }

    async fn saved_posts(&self, user_id: UserId, page: Page) -> Result<Vec<Post>, DatabaseError> {
        let tables = self.tables.read().await;
        let saved = tables
            .saved
            .iter()
            .rev()
            .filter(|(_, owner, _)| *owner == user_id)
            .filter_map(|(_, _, post_id)| tables.posts.get(post_id).cloned());
        Ok(paginate(saved, page))
    }

    async fn save_post(&self, user_id: UserId, post_id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.saved.iter().any(|(_, u, p)| *u == user_id && *p == post_id) {
            return Ok(false);
        }
        let id = tables.next_id();
        tables.saved.push((id, user_id, post_id));
        Ok(true)
    }

    async fn unsave_post(&self, user_id: UserId, post_id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.saved.len();
        tables.saved.retain(|(_, u, p)| !(*u == user_id && *p == post_id));
        Ok(tables.saved.len() < before)
    }

    async fn memories(&self, user_id: UserId, on: NaiveDate, page: Page) -> Result<Vec<Post>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.user_id == user_id && is_memory_of(p.time, on))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(paginate(posts.into_iter(), page))
    }
}

#[async_trait]
impl PokeRepository for MemoryStore {
    async fn received(&self, user_id: UserId, page: Page) -> Result<Vec<Poke>, DatabaseError> {
        let tables = self.tables.read().await;
        let pokes = tables
            .pokes
            .iter()
            .rev()
            .filter(|p| p.receiver_id == user_id)
            .cloned();
        Ok(paginate(pokes, page))
    }

    async fn poke(&self, sender: UserId, receiver: UserId) -> Result<Poke, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .pokes
            .iter()
            .any(|p| p.sender_id == sender && p.receiver_id == receiver)
        {
            return Err(DatabaseError::Conflict(format!("user {} already poked", receiver)));
        }
        let poke = Poke {
            id: tables.next_id(),
            sender_id: sender,
            receiver_id: receiver,
        };
        tables.pokes.push(poke.clone());
        Ok(poke)
    }

    async fn dismiss(&self, receiver: UserId, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.pokes.len();
        tables.pokes.retain(|p| !(p.id == id && p.receiver_id == receiver));
        Ok(tables.pokes.len() < before)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&user_id).map(|u| UserProfile {
            id: user_id,
            username: u.username.clone(),
            name: u.name.clone(),
        }))
    }

    async fn social_links(&self, user_id: UserId) -> Result<Option<SocialLinks>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&user_id).map(|u| u.links.clone()))
    }

    async fn update_social_links(
        &self,
        user_id: UserId,
        update: &SocialLinksUpdate,
    ) -> Result<SocialLinks, DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {user_id}")))?;
        update.apply_to(&mut user.links);
        Ok(user.links.clone())
    }

    async fn delete_account(&self, user_id: UserId) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.sessions.retain(|_, s| s.user_id != user_id);
        tables.saved.retain(|(_, u, _)| *u != user_id);
        tables
            .pokes
            .retain(|p| p.sender_id != user_id && p.receiver_id != user_id);
        Ok(tables.users.remove(&user_id).is_some())
    }
}
