//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its click counter.
///
/// `owner_id` is `None` for links created without an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        code: String,
        target: String,
        owner_id: Option<i64>,
        created_at: DateTime<Utc>,
        click_count: i64,
    ) -> Self {
        Self {
            id,
            code,
            target,
            owner_id,
            created_at,
            click_count,
        }
    }
}

/// Input data for inserting a new link.
///
/// `click_count` always starts at zero and is not part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub target: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            1,
            "abc123".to_string(),
            "https://example.com".to_string(),
            Some(7),
            now,
            0,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.code, "abc123");
        assert_eq!(link.target, "https://example.com");
        assert_eq!(link.owner_id, Some(7));
        assert_eq!(link.created_at, now);
        assert_eq!(link.click_count, 0);
    }

    #[test]
    fn test_new_link_without_owner() {
        let new_link = NewLink {
            code: "xyz789".to_string(),
            target: "https://rust-lang.org".to_string(),
            owner_id: None,
            created_at: Utc::now(),
        };

        assert_eq!(new_link.code, "xyz789");
        assert!(new_link.owner_id.is_none());
    }
}
