//! Comment domain module.
//!
//! - `model`: the comment record and request/response payloads
//! - `ordering`: the display order of a post's comment list
//! - `index`: identity-indexed comment store with derived views, depth and
//!   thread walks over locally cached data

mod index;
mod model;
mod ordering;

pub use index::{CommentIndex, CommentThread, Completeness};
pub use model::{
    Comment, CommentId, CommentPatch, CommentRepliesResponse, DELETED_COMMENT_PLACEHOLDER,
    NewComment, PartialComment, PostCommentsResponse,
};
pub use ordering::{display_order, sort_for_display};

#[cfg(test)]
pub(crate) use model::sample_comment;
