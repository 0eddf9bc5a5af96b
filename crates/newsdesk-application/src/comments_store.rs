//! Comments, reply buckets and thread walks.
//!
//! State is a [`CommentIndex`]: each comment is stored once and every list
//! refers to it by id. Network calls never run under the state lock.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use newsdesk_core::comment::{
    Comment, CommentId, CommentIndex, CommentPatch, CommentThread, NewComment, PartialComment,
    PostCommentsResponse,
};
use newsdesk_core::pagination::Paginated;
use newsdesk_core::post::PostId;
use newsdesk_core::Result;
use newsdesk_interaction::ApiGateway;
use newsdesk_interaction::api::{CommentsApi, QueryPairs};
use tokio::sync::RwLock;

/// Locks the loading set, recovering it if a holder panicked.
fn lock_loading(loading: &Mutex<HashSet<CommentId>>) -> MutexGuard<'_, HashSet<CommentId>> {
    loading.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks a reply bucket as loading until dropped.
struct ReplyLoad<'a> {
    loading: &'a Mutex<HashSet<CommentId>>,
    id: CommentId,
}

impl<'a> ReplyLoad<'a> {
    /// `None` when a load for `id` is already running.
    fn begin(loading: &'a Mutex<HashSet<CommentId>>, id: CommentId) -> Option<Self> {
        lock_loading(loading).insert(id).then(|| Self { loading, id })
    }
}

impl Drop for ReplyLoad<'_> {
    fn drop(&mut self) {
        lock_loading(self.loading).remove(&self.id);
    }
}

pub struct CommentsStore {
    api: CommentsApi,
    index: RwLock<CommentIndex>,
    loading_replies: Mutex<HashSet<CommentId>>,
}

impl CommentsStore {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self {
            api: CommentsApi::new(gateway),
            index: RwLock::new(CommentIndex::new()),
            loading_replies: Mutex::new(HashSet::new()),
        }
    }

    /// Copy of the whole index, for callers that read several views at once.
    pub async fn snapshot(&self) -> CommentIndex {
        self.index.read().await.clone()
    }

    // ============================================================================
    // Fetching
    // ============================================================================

    pub async fn fetch_comments(&self, query: QueryPairs) -> Result<Paginated<Comment>> {
        match self.api.list(query).await {
            Ok(page) => {
                self.index
                    .write()
                    .await
                    .replace_comments(page.results.clone());
                Ok(page)
            }
            Err(e) => {
                tracing::error!("[CommentsStore] Failed to load comments: {}", e);
                self.index.write().await.clear_comments();
                Err(e)
            }
        }
    }

    /// Loads a post's whole comment list and sorts it for display.
    pub async fn fetch_post_comments(&self, post: PostId) -> Result<PostCommentsResponse> {
        match self.api.for_post(post).await {
            Ok(data) => {
                self.index
                    .write()
                    .await
                    .replace_post_comments(data.comments.clone());
                tracing::debug!(
                    "[CommentsStore] Loaded {} comments for post {}",
                    data.comments.len(),
                    post
                );
                Ok(data)
            }
            Err(e) => {
                tracing::error!("[CommentsStore] Failed to load comments of post {}: {}", post, e);
                self.index.write().await.replace_post_comments(Vec::new());
                Err(e)
            }
        }
    }

    pub async fn fetch_comment_by_id(&self, id: CommentId) -> Result<Comment> {
        match self.api.get(id).await {
            Ok(comment) => {
                self.index.write().await.set_current(Some(comment.clone()));
                Ok(comment)
            }
            Err(e) => {
                tracing::error!("[CommentsStore] Failed to load comment {}: {}", id, e);
                self.index.write().await.set_current(None);
                Err(e)
            }
        }
    }

    pub async fn fetch_my_comments(&self, query: QueryPairs) -> Result<Paginated<Comment>> {
        match self.api.my_comments(query).await {
            Ok(page) => {
                self.index
                    .write()
                    .await
                    .replace_my_comments(page.results.clone());
                Ok(page)
            }
            Err(e) => {
                tracing::error!("[CommentsStore] Failed to load my comments: {}", e);
                self.index.write().await.clear_my_comments();
                Err(e)
            }
        }
    }

    /// Loads the reply bucket of `id`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` without issuing a request when a load for the same id is
    /// already in flight. On failure the bucket is set to empty.
    pub async fn fetch_comment_replies(&self, id: CommentId) -> Result<Option<Vec<Comment>>> {
        let Some(_load) = ReplyLoad::begin(&self.loading_replies, id) else {
            tracing::debug!("[CommentsStore] Replies of {} already loading", id);
            return Ok(None);
        };

        match self.api.replies(id).await {
            Ok(data) => {
                self.index.write().await.set_replies(id, data.replies.clone());
                Ok(Some(data.replies))
            }
            Err(e) => {
                tracing::error!("[CommentsStore] Failed to load replies of {}: {}", id, e);
                self.index.write().await.set_replies(id, Vec::new());
                Err(e)
            }
        }
    }

    /// Loads every listed bucket that is neither cached nor loading.
    ///
    /// Loads run concurrently and all of them settle; one failure does not
    /// stop the others. Returns one outcome per id that was actually loaded.
    pub async fn preload_replies(&self, ids: &[CommentId]) -> Vec<(CommentId, Result<()>)> {
        let pending: Vec<CommentId> = {
            let index = self.index.read().await;
            let mut seen = HashSet::new();
            ids.iter()
                .copied()
                .filter(|id| seen.insert(*id))
                .filter(|id| !index.has_replies_loaded(*id) && !self.is_reply_loading(*id))
                .collect()
        };

        let loads = pending.iter().map(|id| async move {
            let outcome = self.fetch_comment_replies(*id).await.map(|_| ());
            (*id, outcome)
        });
        join_all(loads).await
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Creates a comment and projects it into the local views.
    ///
    /// The create endpoint usually echoes only `post`, `parent` and
    /// `content`. Without an id the post's comment list is reloaded and the
    /// new comment is looked up there instead.
    ///
    /// # Returns
    ///
    /// The created comment, or `None` when the write succeeded but the
    /// comment could not be identified afterwards.
    pub async fn create_comment(&self, comment: NewComment) -> Result<Option<Comment>> {
        let echoed = self.api.create(&comment).await.inspect_err(|e| {
            tracing::error!("[CommentsStore] Failed to create comment: {}", e);
        })?;

        match echoed.into_comment() {
            Some(created) => {
                self.index.write().await.insert_created(created.clone());
                tracing::info!(
                    "[CommentsStore] Created comment {} on post {}",
                    created.id,
                    comment.post
                );
                Ok(Some(created))
            }
            None => Ok(self.reload_after_create(&comment).await),
        }
    }

    async fn reload_after_create(&self, comment: &NewComment) -> Option<Comment> {
        tracing::debug!(
            "[CommentsStore] Create response has no id, reloading post {}",
            comment.post
        );
        if let Err(e) = self.fetch_post_comments(comment.post).await {
            tracing::warn!(
                "[CommentsStore] Comment created but post {} could not be reloaded: {}",
                comment.post,
                e
            );
            return None;
        }

        let mut index = self.index.write().await;
        if let Some(parent) = comment.parent {
            index.invalidate_replies(parent);
        }
        let id = index.find_latest(comment.parent, &comment.content)?.id;
        index.track_created(id);
        tracing::info!(
            "[CommentsStore] Created comment {} on post {}",
            id,
            comment.post
        );
        index.get(id).cloned()
    }

    /// Replaces a comment's content.
    ///
    /// The response is merged into the cached entry for `id`, so every view
    /// holding it changes together.
    ///
    /// # Returns
    ///
    /// The updated comment when it is cached or the server sent a full
    /// record, `None` otherwise.
    pub async fn update_comment(
        &self,
        id: CommentId,
        patch: CommentPatch,
    ) -> Result<Option<Comment>> {
        let echoed = self.api.update(id, &patch).await.inspect_err(|e| {
            tracing::error!("[CommentsStore] Failed to update comment {}: {}", id, e);
        })?;
        Ok(self.apply_update(id, echoed).await)
    }

    pub async fn update_comment_partial(
        &self,
        id: CommentId,
        patch: CommentPatch,
    ) -> Result<Option<Comment>> {
        let echoed = self.api.update_partial(id, &patch).await.inspect_err(|e| {
            tracing::error!("[CommentsStore] Failed to update comment {}: {}", id, e);
        })?;
        Ok(self.apply_update(id, echoed).await)
    }

    async fn apply_update(&self, id: CommentId, echoed: PartialComment) -> Option<Comment> {
        let mut index = self.index.write().await;
        match index.merge(id, &echoed) {
            Some(merged) => Some(merged.clone()),
            None => echoed.into_comment(),
        }
    }

    /// Deletes remotely, then soft-deletes the local entry in place.
    pub async fn delete_comment(&self, id: CommentId) -> Result<()> {
        self.api.delete(id).await.inspect_err(|e| {
            tracing::error!("[CommentsStore] Failed to delete comment {}: {}", id, e);
        })?;
        self.index.write().await.soft_delete(id);
        Ok(())
    }

    // ============================================================================
    // Views
    // ============================================================================

    pub async fn post_comments(&self) -> Vec<Comment> {
        owned(self.index.read().await.post_comments())
    }

    pub async fn comments(&self) -> Vec<Comment> {
        owned(self.index.read().await.comments())
    }

    pub async fn my_comments(&self) -> Vec<Comment> {
        owned(self.index.read().await.my_comments())
    }

    pub async fn current_comment(&self) -> Option<Comment> {
        self.index.read().await.current().cloned()
    }

    pub async fn top_level_comments(&self) -> Vec<Comment> {
        owned(self.index.read().await.top_level())
    }

    pub async fn replies_count(&self) -> usize {
        self.index.read().await.replies_count()
    }

    pub async fn total_comments_count(&self) -> usize {
        self.index.read().await.total_count()
    }

    pub async fn comments_by_parent(&self, parent: CommentId) -> Vec<Comment> {
        owned(self.index.read().await.comments_by_parent(parent))
    }

    pub async fn comment_by_id(&self, id: CommentId) -> Option<Comment> {
        self.index.read().await.get(id).cloned()
    }

    pub async fn replies_for_comment(&self, parent: CommentId) -> Vec<Comment> {
        owned(self.index.read().await.replies_for(parent))
    }

    pub fn is_reply_loading(&self, id: CommentId) -> bool {
        lock_loading(&self.loading_replies).contains(&id)
    }

    pub async fn comment_depth(&self, comment: &Comment) -> usize {
        self.index.read().await.depth(comment)
    }

    /// Walks cached data only; see [`CommentThread::completeness`].
    pub async fn comment_thread(&self, id: CommentId) -> CommentThread {
        self.index.read().await.thread(id)
    }

    // ============================================================================
    // Invalidation
    // ============================================================================

    pub async fn invalidate_comment_cache(&self, parent: CommentId) {
        self.index.write().await.invalidate_replies(parent);
    }

    pub async fn clear_comments(&self) {
        self.index.write().await.clear_comments();
    }

    pub async fn clear_post_comments(&self) {
        self.index.write().await.clear_post_comments();
    }

    pub async fn clear_current_comment(&self) {
        self.index.write().await.clear_current();
    }

    pub async fn clear_my_comments(&self) {
        self.index.write().await.clear_my_comments();
    }
}

fn owned(comments: Vec<&Comment>) -> Vec<Comment> {
    comments.into_iter().cloned().collect()
}
