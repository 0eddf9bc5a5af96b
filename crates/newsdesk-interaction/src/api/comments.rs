use std::sync::Arc;

use newsdesk_core::Result;
use newsdesk_core::comment::{
    Comment, CommentId, CommentPatch, CommentRepliesResponse, NewComment, PartialComment,
    PostCommentsResponse,
};
use newsdesk_core::pagination::Paginated;
use newsdesk_core::post::PostId;

use super::QueryPairs;
use crate::gateway::ApiGateway;

const COMMENTS: &str = "/api/v1/comments/";
const MY_COMMENTS: &str = "/api/v1/comments/my-comments/";

fn comment_path(id: CommentId) -> String {
    format!("{}{}/", COMMENTS, id)
}

#[derive(Clone)]
pub struct CommentsApi {
    gateway: Arc<ApiGateway>,
}

impl CommentsApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: QueryPairs) -> Result<Paginated<Comment>> {
        self.gateway.get_json_with(COMMENTS, query).await
    }

    pub async fn get(&self, id: CommentId) -> Result<Comment> {
        self.gateway.get_json(&comment_path(id)).await
    }

    /// The server echoes the submitted fields, usually without an id.
    pub async fn create(&self, comment: &NewComment) -> Result<PartialComment> {
        self.gateway.post_json(COMMENTS, comment).await
    }

    pub async fn update(&self, id: CommentId, patch: &CommentPatch) -> Result<PartialComment> {
        self.gateway.put_json(&comment_path(id), patch).await
    }

    pub async fn update_partial(
        &self,
        id: CommentId,
        patch: &CommentPatch,
    ) -> Result<PartialComment> {
        self.gateway.patch_json(&comment_path(id), patch).await
    }

    pub async fn delete(&self, id: CommentId) -> Result<()> {
        self.gateway.delete(&comment_path(id)).await
    }

    pub async fn my_comments(&self, query: QueryPairs) -> Result<Paginated<Comment>> {
        self.gateway.get_json_with(MY_COMMENTS, query).await
    }

    pub async fn for_post(&self, post: PostId) -> Result<PostCommentsResponse> {
        self.gateway
            .get_json(&format!("{}post/{}/", COMMENTS, post))
            .await
    }

    pub async fn replies(&self, id: CommentId) -> Result<CommentRepliesResponse> {
        self.gateway
            .get_json(&format!("{}replies/", comment_path(id)))
            .await
    }
}
