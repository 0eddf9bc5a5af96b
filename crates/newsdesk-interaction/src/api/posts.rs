use std::sync::Arc;

use newsdesk_core::Result;
use newsdesk_core::pagination::{ListResponse, Paginated};
use newsdesk_core::post::{NewPost, PartialPost, Post, PostPatch};

use super::QueryPairs;
use crate::gateway::ApiGateway;
use crate::transport::FormPart;

const POSTS: &str = "/api/v1/posts/";
const MY_POSTS: &str = "/api/v1/posts/my-posts/";
const POPULAR: &str = "/api/v1/posts/popular/";
const RECENT: &str = "/api/v1/posts/recent/";

fn post_path(slug: &str) -> String {
    format!("{}{}/", POSTS, slug)
}

/// Multipart fields for a post with an attached image.
fn post_form(post: &NewPost, image: FormPart) -> Vec<FormPart> {
    let mut parts = vec![
        FormPart::text("title", post.title.clone()),
        FormPart::text("content", post.content.clone()),
        FormPart::text("status", post.status.to_string()),
    ];
    if let Some(category) = post.category {
        parts.push(FormPart::text("category", category.to_string()));
    }
    parts.push(image);
    parts
}

#[derive(Clone)]
pub struct PostsApi {
    gateway: Arc<ApiGateway>,
}

impl PostsApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: QueryPairs) -> Result<Paginated<Post>> {
        self.gateway.get_json_with(POSTS, query).await
    }

    pub async fn get(&self, slug: &str) -> Result<Post> {
        self.gateway.get_json(&post_path(slug)).await
    }

    /// The server echoes the written fields without `id` or `slug`.
    pub async fn create(&self, post: &NewPost) -> Result<PartialPost> {
        self.gateway.post_json(POSTS, post).await
    }

    /// Creates a post with `image` sent as a multipart file part.
    pub async fn create_with_image(
        &self,
        post: &NewPost,
        image: FormPart,
    ) -> Result<PartialPost> {
        self.gateway
            .post_multipart(POSTS, post_form(post, image))
            .await
    }

    pub async fn update(&self, slug: &str, post: &NewPost) -> Result<PartialPost> {
        self.gateway.put_json(&post_path(slug), post).await
    }

    pub async fn update_partial(&self, slug: &str, patch: &PostPatch) -> Result<PartialPost> {
        self.gateway.patch_json(&post_path(slug), patch).await
    }

    pub async fn delete(&self, slug: &str) -> Result<()> {
        self.gateway.delete(&post_path(slug)).await
    }

    pub async fn my_posts(&self, query: QueryPairs) -> Result<Paginated<Post>> {
        self.gateway.get_json_with(MY_POSTS, query).await
    }

    pub async fn popular(&self) -> Result<Vec<Post>> {
        let list: ListResponse<Post> = self.gateway.get_json(POPULAR).await?;
        Ok(list.into_items())
    }

    pub async fn recent(&self) -> Result<Vec<Post>> {
        let list: ListResponse<Post> = self.gateway.get_json(RECENT).await?;
        Ok(list.into_items())
    }
}
