use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::Platform;

/// Root of a catalog; owns topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub sheet_id: String,
    pub title: String,
    pub order: i64,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPattern {
    pub id: String,
    pub topic_id: String,
    pub title: String,
    pub order: i64,
    pub is_deleted: bool,
}

/// Leaf practice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub sub_pattern_id: String,
    pub title: String,
    pub url: String,
    pub platform: Platform,
    /// Free-form identifier on the platform (e.g. a LeetCode problem number).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
    pub order: i64,
    pub is_deleted: bool,
}

/// Caller-supplied fields for a new problem; key, parent and order are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProblem {
    pub title: String,
    pub url: String,
    pub platform: Platform,
    pub platform_id: Option<String>,
}
