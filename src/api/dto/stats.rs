//! DTOs for link statistics and the owner's link list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Click statistics for one short link.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub code: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for StatsResponse {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            clicks: link.click_count,
            created_at: link.created_at,
        }
    }
}

/// One entry of `GET /api/links`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub code: String,
    pub target: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkSummary {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            target: link.target,
            clicks: link.click_count,
            created_at: link.created_at,
        }
    }
}
