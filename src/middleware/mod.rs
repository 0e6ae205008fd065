pub mod auth;
pub mod response;

pub use auth::{require_session, ActingUser};
pub use response::{ApiResponse, ApiResult};
