//! Identity-indexed comment storage.
//!
//! Every comment the client knows about lives exactly once in `entries`.
//! The collections a UI reads (a post's comment list, the global list, the
//! user's own comments, per-parent reply buckets, the current comment) are
//! id lists into that map, so an update or soft delete is a single write
//! that every view observes.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{Comment, CommentId, PartialComment, sort_for_display};

/// How much of a thread the local cache could produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Completeness {
    /// Every reply the server reports is cached locally.
    Complete,
    /// These comments report more replies than are cached.
    Partial { missing_replies: Vec<CommentId> },
    /// The root comment itself is not cached.
    NotLoaded,
}

/// A comment and all its cached descendants in depth-first pre-order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentThread {
    pub comments: Vec<Comment>,
    pub completeness: Completeness,
}

impl CommentThread {
    pub fn is_complete(&self) -> bool {
        self.completeness == Completeness::Complete
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    entries: HashMap<CommentId, Comment>,
    post_comments: Vec<CommentId>,
    comments: Vec<CommentId>,
    my_comments: Vec<CommentId>,
    replies: HashMap<CommentId, Vec<CommentId>>,
    current: Option<CommentId>,
}

impl CommentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_all(&mut self, comments: Vec<Comment>) -> Vec<CommentId> {
        comments
            .into_iter()
            .map(|comment| {
                let id = comment.id;
                self.entries.insert(id, comment);
                id
            })
            .collect()
    }

    fn resolve<'a>(&'a self, ids: &'a [CommentId]) -> impl Iterator<Item = &'a Comment> + 'a {
        ids.iter().filter_map(|id| self.entries.get(id))
    }

    /// Drops entries no view refers to any more.
    fn prune(&mut self) {
        let mut referenced: HashSet<CommentId> = HashSet::new();
        referenced.extend(&self.post_comments);
        referenced.extend(&self.comments);
        referenced.extend(&self.my_comments);
        referenced.extend(self.replies.values().flatten());
        referenced.extend(self.current);

        self.entries.retain(|id, _| referenced.contains(id));
    }

    // ============================================================================
    // Loading
    // ============================================================================

    /// Replaces a post's comment list, sorted for display.
    pub fn replace_post_comments(&mut self, mut comments: Vec<Comment>) {
        sort_for_display(&mut comments);
        self.post_comments = self.store_all(comments);
        self.prune();
    }

    pub fn replace_comments(&mut self, comments: Vec<Comment>) {
        self.comments = self.store_all(comments);
        self.prune();
    }

    pub fn replace_my_comments(&mut self, comments: Vec<Comment>) {
        self.my_comments = self.store_all(comments);
        self.prune();
    }

    pub fn set_replies(&mut self, parent: CommentId, replies: Vec<Comment>) {
        let ids = self.store_all(replies);
        self.replies.insert(parent, ids);
        self.prune();
    }

    pub fn set_current(&mut self, comment: Option<Comment>) {
        self.current = comment.map(|comment| {
            let id = comment.id;
            self.entries.insert(id, comment);
            id
        });
        self.prune();
    }

    // ============================================================================
    // Reconciliation after mutations
    // ============================================================================

    /// Projects a freshly created comment into the local views.
    ///
    /// Replies are appended to the post list, bump the parent's
    /// `replies_count` and join the parent's reply bucket when that bucket
    /// is loaded. Roots are prepended. Both go to the front of the global
    /// list.
    pub fn insert_created(&mut self, comment: Comment) {
        let id = comment.id;
        let parent = comment.parent;
        self.entries.insert(id, comment);

        match parent {
            Some(parent_id) => {
                self.post_comments.push(id);
                if let Some(parent_comment) = self.entries.get_mut(&parent_id) {
                    parent_comment.replies_count += 1;
                }
                if let Some(bucket) = self.replies.get_mut(&parent_id) {
                    bucket.push(id);
                }
            }
            None => self.post_comments.insert(0, id),
        }

        self.comments.insert(0, id);
    }

    /// Merges a write response into the stored copy of `id`, so every view
    /// holding it sees the change. Returns `None` if no view holds the id.
    pub fn merge(&mut self, id: CommentId, partial: &PartialComment) -> Option<&Comment> {
        let entry = self.entries.get_mut(&id)?;
        entry.merge(partial);
        Some(entry)
    }

    /// Puts an already stored comment at the front of the global list.
    ///
    /// Used when a created comment was picked up by a reload rather than
    /// inserted directly. Returns false if the id is unknown.
    pub fn track_created(&mut self, id: CommentId) -> bool {
        if !self.entries.contains_key(&id) {
            return false;
        }
        self.comments.retain(|existing| *existing != id);
        self.comments.insert(0, id);
        true
    }

    /// Newest post comment under `parent` whose content equals `content`.
    pub fn find_latest(&self, parent: Option<CommentId>, content: &str) -> Option<&Comment> {
        self.resolve(&self.post_comments)
            .filter(|comment| comment.parent == parent && comment.content == content)
            .max_by_key(|comment| (comment.created_at, comment.id))
    }

    /// Soft-deletes in place. Returns false if no view holds the id.
    pub fn soft_delete(&mut self, id: CommentId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.soft_delete();
                true
            }
            None => false,
        }
    }

    // ============================================================================
    // Views
    // ============================================================================

    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.entries.get(&id)
    }

    pub fn post_comments(&self) -> Vec<&Comment> {
        self.resolve(&self.post_comments).collect()
    }

    pub fn comments(&self) -> Vec<&Comment> {
        self.resolve(&self.comments).collect()
    }

    pub fn my_comments(&self) -> Vec<&Comment> {
        self.resolve(&self.my_comments).collect()
    }

    pub fn current(&self) -> Option<&Comment> {
        self.current.and_then(|id| self.entries.get(&id))
    }

    /// Cached replies for `parent`; empty when never loaded.
    pub fn replies_for(&self, parent: CommentId) -> Vec<&Comment> {
        self.replies
            .get(&parent)
            .map(|ids| self.resolve(ids).collect())
            .unwrap_or_default()
    }

    pub fn has_replies_loaded(&self, parent: CommentId) -> bool {
        self.replies.contains_key(&parent)
    }

    pub fn top_level(&self) -> Vec<&Comment> {
        self.resolve(&self.post_comments)
            .filter(|comment| comment.is_root())
            .collect()
    }

    /// Number of replies in the post list.
    pub fn replies_count(&self) -> usize {
        self.resolve(&self.post_comments)
            .filter(|comment| !comment.is_root())
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.post_comments.len()
    }

    /// Direct children of `parent` within the post list.
    pub fn comments_by_parent(&self, parent: CommentId) -> Vec<&Comment> {
        self.resolve(&self.post_comments)
            .filter(|comment| comment.parent == Some(parent))
            .collect()
    }

    // ============================================================================
    // Invalidation
    // ============================================================================

    pub fn invalidate_replies(&mut self, parent: CommentId) {
        self.replies.remove(&parent);
        self.prune();
    }

    /// Forgets the post list together with every reply bucket.
    pub fn clear_post_comments(&mut self) {
        self.post_comments.clear();
        self.replies.clear();
        self.prune();
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
        self.prune();
    }

    pub fn clear_my_comments(&mut self) {
        self.my_comments.clear();
        self.prune();
    }

    pub fn clear_current(&mut self) {
        self.current = None;
        self.prune();
    }

    // ============================================================================
    // Tree walks over local data
    // ============================================================================

    /// Hops from `comment` up its parent chain.
    ///
    /// Stops at a root or at the first parent that is not cached; the hop to
    /// a missing parent still counts.
    pub fn depth(&self, comment: &Comment) -> usize {
        let mut depth = 0;
        let mut parent = comment.parent;

        while let Some(parent_id) = parent {
            depth += 1;
            if depth > self.entries.len() {
                break;
            }
            match self.entries.get(&parent_id) {
                Some(parent_comment) => parent = parent_comment.parent,
                None => break,
            }
        }

        depth
    }

    /// Cached children of `id`: post-list order first, then reply-bucket extras.
    fn children(&self, id: CommentId) -> Vec<CommentId> {
        let mut children: Vec<CommentId> = self
            .resolve(&self.post_comments)
            .filter(|comment| comment.parent == Some(id))
            .map(|comment| comment.id)
            .collect();

        if let Some(bucket) = self.replies.get(&id) {
            for reply in bucket {
                if !children.contains(reply) && self.entries.contains_key(reply) {
                    children.push(*reply);
                }
            }
        }

        children
    }

    /// The comment `id` followed by its cached descendants, depth-first pre-order.
    pub fn thread(&self, id: CommentId) -> CommentThread {
        if !self.entries.contains_key(&id) {
            return CommentThread {
                comments: Vec::new(),
                completeness: Completeness::NotLoaded,
            };
        }

        let mut comments = Vec::new();
        let mut missing_replies = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(comment) = self.entries.get(&current) else {
                continue;
            };

            let children = self.children(current);
            if comment.replies_count as usize > children.len() {
                missing_replies.push(current);
            }
            comments.push(comment.clone());
            stack.extend(children.into_iter().rev());
        }

        let completeness = if missing_replies.is_empty() {
            Completeness::Complete
        } else {
            Completeness::Partial { missing_replies }
        };

        CommentThread {
            comments,
            completeness,
        }
    }
}
