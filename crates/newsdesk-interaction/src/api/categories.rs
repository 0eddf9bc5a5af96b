use std::sync::Arc;

use newsdesk_core::Result;
use newsdesk_core::pagination::ListResponse;
use newsdesk_core::post::{Category, CategoryInput, CategoryPosts};

use super::QueryPairs;
use crate::gateway::ApiGateway;

const CATEGORIES: &str = "/api/v1/posts/categories/";

fn category_path(slug: &str) -> String {
    format!("{}{}/", CATEGORIES, slug)
}

#[derive(Clone)]
pub struct CategoriesApi {
    gateway: Arc<ApiGateway>,
}

impl CategoriesApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: QueryPairs) -> Result<Vec<Category>> {
        let list: ListResponse<Category> = self.gateway.get_json_with(CATEGORIES, query).await?;
        Ok(list.into_items())
    }

    pub async fn get(&self, slug: &str) -> Result<Category> {
        self.gateway.get_json(&category_path(slug)).await
    }

    pub async fn create(&self, input: &CategoryInput) -> Result<Category> {
        self.gateway.post_json(CATEGORIES, input).await
    }

    pub async fn update(&self, slug: &str, input: &CategoryInput) -> Result<Category> {
        self.gateway.put_json(&category_path(slug), input).await
    }

    pub async fn delete(&self, slug: &str) -> Result<()> {
        self.gateway.delete(&category_path(slug)).await
    }

    /// `{category, posts}` for one category.
    pub async fn posts(&self, slug: &str, query: QueryPairs) -> Result<CategoryPosts> {
        self.gateway
            .get_json_with(&format!("{}posts/", category_path(slug)), query)
            .await
    }
}
