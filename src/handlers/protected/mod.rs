// Every handler in this tier runs behind `middleware::require_session` and
// takes its identity from `ActingUser`.
pub mod account;
pub mod feelings;
pub mod memories;
pub mod pokes;
pub mod saved_posts;
pub mod session;
pub mod social_links;
pub mod utils;
