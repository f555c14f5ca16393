//! Keyset cursor for feed pages.
//!
//! Feed order is `(created_at DESC, id DESC)`; a cursor names the last item of
//! the previous page and the next page starts strictly after it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Post;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl FeedCursor {
    pub fn after_post(post: &Post) -> Self {
        Self {
            created_at: post.created_at,
            id: post.id,
        }
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.created_at.timestamp_micros(), self.id))
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let invalid = || AppError::InvalidInput("Invalid cursor".to_string());

        let bytes = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid())?;
        let text = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (micros, id) = text.split_once(':').ok_or_else(invalid)?;

        let micros: i64 = micros.parse().map_err(|_| invalid())?;
        let created_at = DateTime::from_timestamp_micros(micros).ok_or_else(invalid)?;
        let id = Uuid::parse_str(id).map_err(|_| invalid())?;

        Ok(Self { created_at, id })
    }

    /// True when `post` sorts strictly after this cursor in feed order
    pub fn precedes(&self, post: &Post) -> bool {
        (post.created_at, post.id) < (self.created_at, self.id)
    }
}

/// One page of a descending listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub after: Option<FeedCursor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cursor_survives_encoding() {
        let cursor = FeedCursor {
            created_at: Utc.timestamp_micros(1_700_000_000_123_456).unwrap(),
            id: Uuid::new_v4(),
        };

        assert_eq!(FeedCursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn test_garbage_cursor_is_invalid_input() {
        for raw in ["", "!!!", "bm90LWEtY3Vyc29y"] {
            match FeedCursor::decode(raw) {
                Err(AppError::InvalidInput(_)) => {}
                other => panic!("expected InvalidInput for {:?}, got {:?}", raw, other),
            }
        }
    }
}
