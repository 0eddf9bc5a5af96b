//! Comment model and payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::PostId;
use crate::user::{AuthorInfo, UserId};

pub type CommentId = i64;

/// Content shown in place of a soft-deleted comment.
pub const DELETED_COMMENT_PLACEHOLDER: &str = "[Comment deleted]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author: UserId,
    #[serde(default)]
    pub author_info: Option<AuthorInfo>,
    #[serde(default)]
    pub parent: Option<CommentId>,
    #[serde(default)]
    pub post: Option<PostId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub replies_count: u32,
    #[serde(default)]
    pub is_reply: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Marks the comment inactive and redacts its content.
    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.content = DELETED_COMMENT_PLACEHOLDER.to_string();
    }

    /// Overwrites the fields `partial` carries. `id`, `parent` and `post`
    /// never change after creation and are left alone.
    pub fn merge(&mut self, partial: &PartialComment) {
        if let Some(content) = &partial.content {
            self.content = content.clone();
        }
        if let Some(author_info) = &partial.author_info {
            self.author_info = Some(author_info.clone());
        }
        if let Some(is_active) = partial.is_active {
            self.is_active = is_active;
        }
        if let Some(replies_count) = partial.replies_count {
            self.replies_count = replies_count;
        }
        if partial.updated_at.is_some() {
            self.updated_at = partial.updated_at;
        }
    }
}

/// Body returned by the comment write endpoints.
///
/// The create serializer echoes `post`, `parent` and `content`; the update
/// serializer echoes only `content`. Anything else may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialComment {
    pub id: Option<CommentId>,
    pub content: Option<String>,
    pub author: Option<UserId>,
    pub author_info: Option<AuthorInfo>,
    pub parent: Option<CommentId>,
    pub post: Option<PostId>,
    pub is_active: Option<bool>,
    pub replies_count: Option<u32>,
    pub is_reply: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PartialComment {
    /// The full record, when the body carries every required field.
    pub fn into_comment(self) -> Option<Comment> {
        let is_reply = self.is_reply.unwrap_or(self.parent.is_some());
        Some(Comment {
            id: self.id?,
            content: self.content?,
            author: self.author?,
            author_info: self.author_info,
            parent: self.parent,
            post: self.post,
            is_active: self.is_active.unwrap_or(true),
            replies_count: self.replies_count.unwrap_or(0),
            is_reply,
            created_at: self.created_at?,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComment {
    pub post: PostId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,
    pub content: String,
}

/// Body of PUT and PATCH `/comments/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentPatch {
    pub content: String,
}

/// Response of `/comments/post/{post_id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostCommentsResponse {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub comments_count: Option<u64>,
}

/// Response of `/comments/{id}/replies/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRepliesResponse {
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[cfg(test)]
pub(crate) fn sample_comment(id: CommentId, parent: Option<CommentId>, created: i64) -> Comment {
    Comment {
        id,
        content: format!("comment {}", id),
        author: 1,
        author_info: None,
        parent,
        post: Some(1),
        is_active: true,
        replies_count: 0,
        is_reply: parent.is_some(),
        created_at: DateTime::from_timestamp(created, 0).unwrap(),
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_delete_is_idempotent() {
        let mut comment = sample_comment(1, None, 0);
        comment.soft_delete();
        let once = comment.clone();
        comment.soft_delete();

        assert_eq!(comment, once);
        assert!(!comment.is_active);
        assert_eq!(comment.content, DELETED_COMMENT_PLACEHOLDER);
    }

    #[test]
    fn test_missing_is_active_defaults_to_true() {
        let comment: Comment = serde_json::from_str(
            r#"{"id": 5, "content": "hi", "author": 2, "created_at": "2024-03-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(comment.is_active);
        assert!(comment.is_root());
    }

    #[test]
    fn test_create_echo_is_not_a_full_comment() {
        let echo: PartialComment =
            serde_json::from_str(r#"{"post": 7, "parent": null, "content": "hi"}"#).unwrap();
        assert_eq!(echo.post, Some(7));
        assert_eq!(echo.content.as_deref(), Some("hi"));
        assert!(echo.into_comment().is_none());
    }

    #[test]
    fn test_merge_only_touches_echoed_fields() {
        let mut comment = sample_comment(3, Some(1), 10);
        comment.replies_count = 2;
        let echo: PartialComment = serde_json::from_str(r#"{"content": "edited"}"#).unwrap();

        comment.merge(&echo);

        assert_eq!(comment.content, "edited");
        assert_eq!(comment.id, 3);
        assert_eq!(comment.parent, Some(1));
        assert_eq!(comment.replies_count, 2);
        assert!(comment.is_active);
    }

    #[test]
    fn test_full_echo_becomes_comment() {
        let echo: PartialComment = serde_json::from_str(
            r#"{"id": 9, "content": "x", "author": 2, "parent": 4, "created_at": "2024-03-01T00:00:00Z"}"#,
        )
        .unwrap();
        let comment = echo.into_comment().unwrap();
        assert_eq!(comment.id, 9);
        assert!(comment.is_reply);
    }
}
