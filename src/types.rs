use serde::{Deserialize, Serialize};
use std::fmt;

/// Legacy `Wo_Users.user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

/// Offset pagination applied to every list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

/// Bounds used when turning a client `?limit=&offset=` into a [`Page`].
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PageLimits {
    pub fn page(&self, limit: Option<u32>, offset: Option<u32>) -> Page {
        let limit = match limit {
            Some(0) | None => self.default_limit,
            Some(n) => n.min(self.max_limit),
        };
        Page {
            limit,
            offset: offset.unwrap_or(0),
        }
    }
}

/// One page of results as it is serialized to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: Page) -> Self {
        Self {
            items,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_uses_default_when_limit_missing_or_zero() {
        let limits = PageLimits::default();
        assert_eq!(limits.page(None, None), Page { limit: 20, offset: 0 });
        assert_eq!(limits.page(Some(0), Some(40)), Page { limit: 20, offset: 40 });
    }

    #[test]
    fn page_clamps_to_max_limit() {
        let limits = PageLimits { default_limit: 10, max_limit: 50 };
        assert_eq!(limits.page(Some(500), None).limit, 50);
        assert_eq!(limits.page(Some(7), None).limit, 7);
    }

    #[test]
    fn user_id_serializes_as_bare_number() {
        let v = serde_json::to_value(UserId(42)).unwrap();
        assert_eq!(v, serde_json::json!(42));
    }
}
