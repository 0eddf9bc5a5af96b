//! Display order for a post's comment list.

use std::cmp::Ordering;

use super::Comment;

/// Roots before replies, roots newest-first, replies oldest-first.
pub fn display_order(a: &Comment, b: &Comment) -> Ordering {
    match (a.parent, b.parent) {
        (None, None) => b.created_at.cmp(&a.created_at),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(_), Some(_)) => a.created_at.cmp(&b.created_at),
    }
}

/// Stable sort by [`display_order`].
pub fn sort_for_display(comments: &mut [Comment]) {
    comments.sort_by(display_order);
}
