//! Posts and categories.
//!
//! One paginated window (`posts`) always reflects the last executed list
//! query. Mutations project onto the window locally instead of refetching,
//! except when the write response lacks what the projection needs: a create
//! echo without `id` or a retitle without the derived `slug`. Those reload
//! the current window.

use std::sync::Arc;

use newsdesk_core::pagination::{Paginated, Pagination};
use newsdesk_core::post::{
    Category, CategoryId, CategoryInput, CategoryPosts, NewPost, PartialPost, Post, PostFilters,
    PostPatch, PostQuery, PostStatus,
};
use newsdesk_core::Result;
use newsdesk_interaction::api::{CategoriesApi, PostsApi, QueryPairs};
use newsdesk_interaction::{ApiGateway, FormPart};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct PostsState {
    pub posts: Vec<Post>,
    pub current_post: Option<Post>,
    pub categories: Vec<Category>,
    pub popular_posts: Vec<Post>,
    pub recent_posts: Vec<Post>,
    pub my_posts: Vec<Post>,
    pub pagination: Pagination,
    pub filters: PostFilters,
}

impl PostsState {
    fn new(page_size: u32) -> Self {
        Self {
            posts: Vec::new(),
            current_post: None,
            categories: Vec::new(),
            popular_posts: Vec::new(),
            recent_posts: Vec::new(),
            my_posts: Vec::new(),
            pagination: Pagination::with_page_size(page_size),
            filters: PostFilters::default(),
        }
    }

    /// Merges a write response into every cached copy of `slug`.
    ///
    /// # Returns
    ///
    /// The merged post, and whether the title changed without the new slug
    /// being echoed. `None` when nothing cached matches `slug`.
    fn merge_post(&mut self, slug: &str, echoed: &PartialPost) -> Option<(Post, bool)> {
        let mut merged = None;
        let cached = self
            .posts
            .iter_mut()
            .chain(self.current_post.iter_mut())
            .filter(|post| post.slug == slug);
        for post in cached {
            let retitled = echoed
                .title
                .as_ref()
                .is_some_and(|title| *title != post.title);
            post.merge(echoed);
            merged = Some((post.clone(), retitled && echoed.slug.is_none()));
        }
        merged
    }
}

pub struct PostsStore {
    posts_api: PostsApi,
    categories_api: CategoriesApi,
    page_size: u32,
    state: RwLock<PostsState>,
}

impl PostsStore {
    pub fn new(gateway: Arc<ApiGateway>, page_size: u32) -> Self {
        Self {
            posts_api: PostsApi::new(gateway.clone()),
            categories_api: CategoriesApi::new(gateway),
            page_size,
            state: RwLock::new(PostsState::new(page_size)),
        }
    }

    pub async fn snapshot(&self) -> PostsState {
        self.state.read().await.clone()
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.state.read().await.posts.clone()
    }

    pub async fn current_post(&self) -> Option<Post> {
        self.state.read().await.current_post.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.pagination.clone()
    }

    pub async fn filters(&self) -> PostFilters {
        self.state.read().await.filters.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    // ============================================================================
    // Post window
    // ============================================================================

    /// Loads one page of posts.
    ///
    /// `query` overrides the persisted filters for this call only; the
    /// filters themselves are not changed. The page defaults to the
    /// current one.
    pub async fn fetch_posts(&self, query: PostQuery) -> Result<Paginated<Post>> {
        let (pairs, page, page_size) = {
            let state = self.state.read().await;
            let mut filters = state.filters.clone();
            filters.merge(&query);
            let page = query.page.unwrap_or(state.pagination.current_page);
            let page_size = query.page_size.unwrap_or(state.pagination.page_size);
            (filters.to_query_pairs(page, page_size), page, page_size)
        };

        match self.posts_api.list(pairs).await {
            Ok(data) => {
                let mut state = self.state.write().await;
                state.posts = data.results.clone();
                state.pagination = Pagination {
                    count: data.count,
                    next: data.next.clone(),
                    previous: data.previous.clone(),
                    current_page: page,
                    page_size,
                };
                tracing::debug!(
                    "[PostsStore] Loaded page {} ({} of {} posts)",
                    page,
                    data.results.len(),
                    data.count
                );
                Ok(data)
            }
            Err(e) => {
                tracing::error!("[PostsStore] Failed to load posts: {}", e);
                self.state.write().await.posts.clear();
                Err(e)
            }
        }
    }

    pub async fn fetch_post_by_slug(&self, slug: &str) -> Result<Post> {
        match self.posts_api.get(slug).await {
            Ok(post) => {
                self.state.write().await.current_post = Some(post.clone());
                Ok(post)
            }
            Err(e) => {
                tracing::error!("[PostsStore] Failed to load post '{}': {}", slug, e);
                self.state.write().await.current_post = None;
                Err(e)
            }
        }
    }

    /// Creates a post and prepends it to the window.
    ///
    /// # Returns
    ///
    /// The created post, or `None` when the write succeeded but the post is
    /// not in the reloaded window (for example a draft under the default
    /// status filter).
    pub async fn create_post(&self, post: NewPost) -> Result<Option<Post>> {
        let echoed = self.posts_api.create(&post).await.inspect_err(|e| {
            tracing::error!("[PostsStore] Failed to create post: {}", e);
        })?;
        Ok(self.project_created(&post, echoed).await)
    }

    /// Creates a post with a cover image in one multipart request.
    pub async fn create_post_with_image(
        &self,
        post: NewPost,
        image: FormPart,
    ) -> Result<Option<Post>> {
        let echoed = self
            .posts_api
            .create_with_image(&post, image)
            .await
            .inspect_err(|e| {
                tracing::error!("[PostsStore] Failed to create post with image: {}", e);
            })?;
        Ok(self.project_created(&post, echoed).await)
    }

    async fn project_created(&self, post: &NewPost, echoed: PartialPost) -> Option<Post> {
        match echoed.into_post() {
            Some(created) => {
                let mut state = self.state.write().await;
                state.posts.insert(0, created.clone());
                state.pagination.count += 1;
                tracing::info!("[PostsStore] Created post '{}'", created.slug);
                Some(created)
            }
            None => self.reload_after_create(&post.title).await,
        }
    }

    async fn reload_after_create(&self, title: &str) -> Option<Post> {
        tracing::debug!("[PostsStore] Create response has no id, reloading the window");
        if let Err(e) = self.fetch_posts(PostQuery::default()).await {
            tracing::warn!("[PostsStore] Post created but the window could not be reloaded: {}", e);
            return None;
        }

        let state = self.state.read().await;
        let created = state
            .posts
            .iter()
            .filter(|post| post.title == title)
            .max_by_key(|post| (post.created_at, post.id))
            .cloned();
        if let Some(created) = &created {
            tracing::info!("[PostsStore] Created post '{}'", created.slug);
        }
        created
    }

    /// Replaces a post.
    ///
    /// # Returns
    ///
    /// The updated post when it is cached or the server sent a full record,
    /// `None` otherwise.
    pub async fn update_post(&self, slug: &str, post: NewPost) -> Result<Option<Post>> {
        let echoed = self.posts_api.update(slug, &post).await.inspect_err(|e| {
            tracing::error!("[PostsStore] Failed to update post '{}': {}", slug, e);
        })?;
        Ok(self.apply_update(slug, echoed).await)
    }

    pub async fn update_post_partial(&self, slug: &str, patch: PostPatch) -> Result<Option<Post>> {
        let echoed = self
            .posts_api
            .update_partial(slug, &patch)
            .await
            .inspect_err(|e| {
                tracing::error!("[PostsStore] Failed to update post '{}': {}", slug, e);
            })?;
        Ok(self.apply_update(slug, echoed).await)
    }

    async fn apply_update(&self, slug: &str, echoed: PartialPost) -> Option<Post> {
        let merged = self.state.write().await.merge_post(slug, &echoed);
        match merged {
            Some((post, true)) => Some(self.reload_retitled(post).await),
            Some((post, false)) => Some(post),
            None => echoed.into_post(),
        }
    }

    /// Picks up the slug the server derived from a new title.
    async fn reload_retitled(&self, mut post: Post) -> Post {
        tracing::debug!("[PostsStore] Post {} was retitled, reloading the window", post.id);
        if let Err(e) = self.fetch_posts(PostQuery::default()).await {
            tracing::warn!("[PostsStore] Could not reload after retitling post {}: {}", post.id, e);
            return post;
        }

        let mut state = self.state.write().await;
        let Some(slug) = state
            .posts
            .iter()
            .find(|entry| entry.id == post.id)
            .map(|entry| entry.slug.clone())
        else {
            return post;
        };
        if let Some(current) = state.current_post.as_mut().filter(|current| current.id == post.id) {
            current.slug = slug.clone();
        }
        post.slug = slug;
        post
    }

    pub async fn delete_post(&self, slug: &str) -> Result<()> {
        self.posts_api.delete(slug).await.inspect_err(|e| {
            tracing::error!("[PostsStore] Failed to delete post '{}': {}", slug, e);
        })?;

        let mut state = self.state.write().await;
        if let Some(index) = state.posts.iter().position(|post| post.slug == slug) {
            state.posts.remove(index);
            state.pagination.count = state.pagination.count.saturating_sub(1);
        }
        if state
            .current_post
            .as_ref()
            .is_some_and(|current| current.slug == slug)
        {
            state.current_post = None;
        }
        Ok(())
    }

    // ============================================================================
    // Filters
    // ============================================================================

    /// Merges `query` into the persisted filters and rewinds to page 1.
    /// Does not fetch.
    pub async fn set_filters(&self, query: PostQuery) {
        let mut state = self.state.write().await;
        state.filters.merge(&query);
        state.pagination.current_page = 1;
    }

    pub async fn clear_filters(&self) {
        let mut state = self.state.write().await;
        state.filters = PostFilters::default();
        state.pagination.current_page = 1;
    }

    pub async fn search_posts(&self, search: &str) -> Result<Paginated<Post>> {
        self.set_filters(PostQuery {
            search: Some(search.to_string()),
            ..PostQuery::default()
        })
        .await;
        self.fetch_posts(PostQuery::default()).await
    }

    /// `None` removes the category filter.
    pub async fn filter_by_category(&self, category: Option<CategoryId>) -> Result<Paginated<Post>> {
        self.set_filters(PostQuery {
            category: Some(category),
            ..PostQuery::default()
        })
        .await;
        self.fetch_posts(PostQuery::default()).await
    }

    pub async fn sort_posts(&self, ordering: &str) -> Result<Paginated<Post>> {
        self.set_filters(PostQuery {
            ordering: Some(ordering.to_string()),
            ..PostQuery::default()
        })
        .await;
        self.fetch_posts(PostQuery::default()).await
    }

    // ============================================================================
    // Pagination
    // ============================================================================

    /// Moves the window to `page`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` without touching state when `page` lies outside
    /// `[1, total_pages]`.
    pub async fn go_to_page(&self, page: u32) -> Result<Option<Paginated<Post>>> {
        {
            let mut state = self.state.write().await;
            if !state.pagination.contains_page(page) {
                tracing::debug!(
                    "[PostsStore] Page {} outside 1..={}, ignoring",
                    page,
                    state.pagination.total_pages()
                );
                return Ok(None);
            }
            state.pagination.current_page = page;
        }
        self.fetch_posts(PostQuery::page(page)).await.map(Some)
    }

    pub async fn next_page(&self) -> Result<Option<Paginated<Post>>> {
        let target = {
            let state = self.state.read().await;
            state
                .pagination
                .has_next_page()
                .then(|| state.pagination.current_page.saturating_add(1))
        };
        match target {
            Some(page) => self.go_to_page(page).await,
            None => Ok(None),
        }
    }

    pub async fn previous_page(&self) -> Result<Option<Paginated<Post>>> {
        let target = {
            let state = self.state.read().await;
            state
                .pagination
                .has_previous_page()
                .then(|| state.pagination.current_page.saturating_sub(1))
        };
        match target {
            Some(page) => self.go_to_page(page).await,
            None => Ok(None),
        }
    }

    // ============================================================================
    // Secondary lists
    // ============================================================================

    pub async fn fetch_my_posts(&self, query: QueryPairs) -> Result<Paginated<Post>> {
        match self.posts_api.my_posts(query).await {
            Ok(data) => {
                self.state.write().await.my_posts = data.results.clone();
                Ok(data)
            }
            Err(e) => {
                tracing::error!("[PostsStore] Failed to load my posts: {}", e);
                self.state.write().await.my_posts.clear();
                Err(e)
            }
        }
    }

    pub async fn fetch_popular_posts(&self) -> Result<Vec<Post>> {
        match self.posts_api.popular().await {
            Ok(posts) => {
                self.state.write().await.popular_posts = posts.clone();
                Ok(posts)
            }
            Err(e) => {
                tracing::error!("[PostsStore] Failed to load popular posts: {}", e);
                self.state.write().await.popular_posts.clear();
                Err(e)
            }
        }
    }

    pub async fn fetch_recent_posts(&self) -> Result<Vec<Post>> {
        match self.posts_api.recent().await {
            Ok(posts) => {
                self.state.write().await.recent_posts = posts.clone();
                Ok(posts)
            }
            Err(e) => {
                tracing::error!("[PostsStore] Failed to load recent posts: {}", e);
                self.state.write().await.recent_posts.clear();
                Err(e)
            }
        }
    }

    // ============================================================================
    // Categories
    // ============================================================================

    pub async fn fetch_categories(&self, query: QueryPairs) -> Result<Vec<Category>> {
        match self.categories_api.list(query).await {
            Ok(categories) => {
                self.state.write().await.categories = categories.clone();
                Ok(categories)
            }
            Err(e) => {
                tracing::error!("[PostsStore] Failed to load categories: {}", e);
                self.state.write().await.categories.clear();
                Err(e)
            }
        }
    }

    /// Fetches one category and refreshes its cached entry.
    pub async fn fetch_category(&self, slug: &str) -> Result<Category> {
        let category = self.categories_api.get(slug).await?;
        let mut state = self.state.write().await;
        if let Some(entry) = state.categories.iter_mut().find(|c| c.id == category.id) {
            *entry = category.clone();
        }
        Ok(category)
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        let category = self.categories_api.create(&input).await.inspect_err(|e| {
            tracing::error!("[PostsStore] Failed to create category: {}", e);
        })?;
        self.state.write().await.categories.insert(0, category.clone());
        Ok(category)
    }

    pub async fn update_category(&self, slug: &str, input: CategoryInput) -> Result<Category> {
        let category = self
            .categories_api
            .update(slug, &input)
            .await
            .inspect_err(|e| {
                tracing::error!("[PostsStore] Failed to update category '{}': {}", slug, e);
            })?;
        let mut state = self.state.write().await;
        if let Some(entry) = state.categories.iter_mut().find(|c| c.slug == slug) {
            *entry = category.clone();
        }
        Ok(category)
    }

    pub async fn delete_category(&self, slug: &str) -> Result<()> {
        self.categories_api.delete(slug).await.inspect_err(|e| {
            tracing::error!("[PostsStore] Failed to delete category '{}': {}", slug, e);
        })?;
        self.state
            .write()
            .await
            .categories
            .retain(|category| category.slug != slug);
        Ok(())
    }

    /// Replaces the post window with the category's posts. Pagination is
    /// left as is; this endpoint is not paginated.
    pub async fn fetch_posts_by_category(
        &self,
        slug: &str,
        query: QueryPairs,
    ) -> Result<CategoryPosts> {
        match self.categories_api.posts(slug, query).await {
            Ok(data) => {
                self.state.write().await.posts = data.posts.clone();
                Ok(data)
            }
            Err(e) => {
                tracing::error!("[PostsStore] Failed to load posts of '{}': {}", slug, e);
                self.state.write().await.posts.clear();
                Err(e)
            }
        }
    }

    // ============================================================================
    // Derived views and lookups
    // ============================================================================

    pub async fn published_posts(&self) -> Vec<Post> {
        self.posts_with_status(PostStatus::Published).await
    }

    pub async fn draft_posts(&self) -> Vec<Post> {
        self.posts_with_status(PostStatus::Draft).await
    }

    async fn posts_with_status(&self, status: PostStatus) -> Vec<Post> {
        self.state
            .read()
            .await
            .posts
            .iter()
            .filter(|post| post.status == status)
            .cloned()
            .collect()
    }

    pub async fn post_from_cache(&self, slug: &str) -> Option<Post> {
        self.state
            .read()
            .await
            .posts
            .iter()
            .find(|post| post.slug == slug)
            .cloned()
    }

    pub async fn category_by_id(&self, id: CategoryId) -> Option<Category> {
        self.state
            .read()
            .await
            .categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    /// Empties the window and resets the cursor.
    pub async fn clear_posts(&self) {
        let mut state = self.state.write().await;
        state.posts.clear();
        state.pagination = Pagination::with_page_size(self.page_size);
    }

    pub async fn clear_current_post(&self) {
        self.state.write().await.current_post = None;
    }
}
