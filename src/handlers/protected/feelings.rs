use serde::Serialize;

use crate::middleware::{ActingUser, ApiResponse, ApiResult};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Feeling {
    pub name: &'static str,
    pub label: &'static str,
}

const fn feeling(name: &'static str, label: &'static str) -> Feeling {
    Feeling { name, label }
}

/// Feelings a post can be tagged with, in display order.
pub const FEELINGS: &[Feeling] = &[
    feeling("happy", "Happy"),
    feeling("loved", "Loved"),
    feeling("sad", "Sad"),
    feeling("so_sad", "So sad"),
    feeling("angry", "Angry"),
    feeling("confused", "Confused"),
    feeling("smirk", "Smirk"),
    feeling("broke", "Broke"),
    feeling("expressionless", "Expressionless"),
    feeling("cool", "Cool"),
    feeling("funny", "Funny"),
    feeling("tired", "Tired"),
    feeling("lovely", "Lovely"),
    feeling("blessed", "Blessed"),
    feeling("shocked", "Shocked"),
    feeling("sleepy", "Sleepy"),
    feeling("pretty", "Pretty"),
    feeling("bored", "Bored"),
];

/// GET /api/feelings
pub async fn list(_acting: ActingUser) -> ApiResult<&'static [Feeling]> {
    Ok(ApiResponse::success(FEELINGS))
}
