use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Compact identity as embedded in posts, comments and follow listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_pic: Option<String>,
}

impl UserSummary {
    /// Stand-in used when an author has vanished from the identity directory
    pub fn placeholder(id: Uuid) -> Self {
        Self {
            id,
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            profile_pic: None,
        }
    }
}

/// Full profile owned by the user-management collaborator; read-only here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_pic: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.user_id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile_pic: self.profile_pic.clone(),
        }
    }
}

/// Directed follow edge: `follower_id` follows `followee_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEdge {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post kind, stored as a one-letter code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostKind {
    #[default]
    #[serde(rename = "P")]
    Regular,
    #[serde(rename = "S")]
    Story,
}

impl PostKind {
    pub fn as_code(&self) -> &'static str {
        match self {
            PostKind::Regular => "P",
            PostKind::Story => "S",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(PostKind::Regular),
            "S" => Some(PostKind::Story),
            _ => None,
        }
    }
}

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: String,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a post about to be inserted
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub caption: String,
    pub image: Option<String>,
    pub kind: PostKind,
}

/// Partial update; `None` leaves the field untouched.
/// `image: Some(None)` clears the image.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub caption: Option<String>,
    pub image: Option<Option<String>>,
    pub kind: Option<PostKind>,
}

/// Like entity - at most one per (user_id, post_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Result of a like insert attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    Created(Like),
    AlreadyLiked,
    PostMissing,
}

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post as seen by a particular viewer: author summary plus derived engagement state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub user: UserSummary,
    pub caption: String,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub like_count: i64,
    pub comment_count: i64,
    pub is_liked: bool,
}

/// Comment with its author resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub user: UserSummary,
    pub post: Uuid,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Follow edge with both ends resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdgeView {
    pub id: Uuid,
    pub follower: UserSummary,
    pub following: UserSummary,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_kind_codes() {
        assert_eq!(PostKind::Regular.as_code(), "P");
        assert_eq!(PostKind::Story.as_code(), "S");
        assert_eq!(PostKind::from_code("S"), Some(PostKind::Story));
        assert_eq!(PostKind::from_code("X"), None);
        assert_eq!(PostKind::default(), PostKind::Regular);
    }

    #[test]
    fn test_post_serializes_kind_as_type() {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            caption: "hello".to_string(),
            image: None,
            kind: PostKind::Story,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "S");
        assert!(json.get("kind").is_none());
    }
}
