use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted review. Created once per external review id, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRow {
    pub id: i64,
    pub place_id: String,
    pub author: String,
    pub rating: i32,
    pub text: Option<String>,
    /// Relative date as delivered by the fetch service, e.g. "3 weeks ago".
    pub review_date: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A review about to be inserted; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub place_id: String,
    pub author: String,
    pub rating: i32,
    pub text: Option<String>,
    pub review_date: String,
    pub external_id: Option<String>,
}
