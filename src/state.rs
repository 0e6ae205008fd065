use sqlx::MySqlPool;
use std::sync::Arc;

use crate::auth::SessionAuthenticator;
use crate::database::{
    MemoryStore, MySqlPokeRepository, MySqlPostRepository, MySqlSessionStore, MySqlUserRepository,
    PokeRepository, PostRepository, SessionStore, UserRepository,
};
use crate::types::PageLimits;

/// Shared handles passed to every handler. Stores are injected, never global.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: SessionAuthenticator,
    pub sessions: Arc<dyn SessionStore>,
    pub posts: Arc<dyn PostRepository>,
    pub pokes: Arc<dyn PokeRepository>,
    pub users: Arc<dyn UserRepository>,
    pub page_limits: PageLimits,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        posts: Arc<dyn PostRepository>,
        pokes: Arc<dyn PokeRepository>,
        users: Arc<dyn UserRepository>,
        page_limits: PageLimits,
    ) -> Self {
        Self {
            authenticator: SessionAuthenticator::new(sessions.clone()),
            sessions,
            posts,
            pokes,
            users,
            page_limits,
        }
    }

    pub fn mysql(pool: MySqlPool, page_limits: PageLimits) -> Self {
        Self::new(
            Arc::new(MySqlSessionStore::new(pool.clone())),
            Arc::new(MySqlPostRepository::new(pool.clone())),
            Arc::new(MySqlPokeRepository::new(pool.clone())),
            Arc::new(MySqlUserRepository::new(pool)),
            page_limits,
        )
    }

    pub fn in_memory(store: Arc<MemoryStore>, page_limits: PageLimits) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), store, page_limits)
    }
}
