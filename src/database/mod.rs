pub mod error;
pub mod manager;
pub mod memory;
pub mod pokes;
pub mod posts;
pub mod sessions;
pub mod users;

pub use error::DatabaseError;
pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use pokes::{MySqlPokeRepository, Poke, PokeRepository};
pub use posts::{MySqlPostRepository, Post, PostRepository};
pub use sessions::{MySqlSessionStore, Session, SessionStore};
pub use users::{MySqlUserRepository, SocialLinks, SocialLinksUpdate, UserProfile, UserRepository};
