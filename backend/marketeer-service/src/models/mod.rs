/// Data structures for users, product profiles, and content items
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The network's post length limit, enforced on generated and published text
pub const POST_TEXT_LIMIT: usize = 280;

/// Lifecycle status of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Generated,
    Scheduled,
    Posted,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Generated => "generated",
            ContentStatus::Scheduled => "scheduled",
            ContentStatus::Posted => "posted",
        }
    }

    /// Parse a client-supplied status string
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "generated" => Some(ContentStatus::Generated),
            "scheduled" => Some(ContentStatus::Scheduled),
            "posted" => Some(ContentStatus::Posted),
            _ => None,
        }
    }
}

/// A network user, upserted by username on every sign-in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product profile, one per user, used to parametrize generation prompts
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_name: String,
    pub description: String,
    pub target_audience: String,
    pub key_features: Vec<String>,
    pub tone_preference: String,
    pub custom_tone: Option<String>,
    pub handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A generated marketing post tracked through its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub product_name: Option<String>,
    pub status: ContentStatus,
    /// Network-assigned post id; present exactly when status is `posted`
    pub external_post_id: Option<String>,
    pub likes: Option<i32>,
    pub replies: Option<i32>,
    pub reposts: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            ContentStatus::Generated,
            ContentStatus::Scheduled,
            ContentStatus::Posted,
        ] {
            assert_eq!(ContentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ContentStatus::parse("archived"), None);
    }
}
