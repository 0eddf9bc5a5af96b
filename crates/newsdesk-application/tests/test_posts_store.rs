mod common;

use common::*;
use newsdesk_core::NewsdeskError;
use newsdesk_core::post::{CategoryInput, NewPost, PostPatch, PostQuery, PostStatus};
use newsdesk_interaction::{ApiRequest, Method};
use serde_json::json;

fn query_value<'a>(request: &'a ApiRequest, key: &str) -> Option<&'a str> {
    request
        .query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Loads page 1 of a 41-post listing (3 pages of 20).
async fn loaded() -> Harness {
    let h = harness();
    h.transport.reply(
        Method::Get,
        POSTS,
        200,
        page_json(
            41,
            vec![post_json(1, "first", "published"), post_json(2, "draft-one", "draft")],
            Some("http://localhost:8000/api/v1/posts/?page=2"),
            None,
        ),
    );
    h.ctx.posts().fetch_posts(PostQuery::default()).await.unwrap();
    h
}

fn new_post(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "body".to_string(),
        category: None,
        status: PostStatus::Published,
    }
}

// ============================================================================
// Window and filters
// ============================================================================

#[tokio::test]
async fn test_fetch_posts_sends_filter_defaults() {
    let h = loaded().await;

    let request = h.transport.last_request(Method::Get, POSTS).unwrap();
    assert_eq!(query_value(&request, "status"), Some("published"));
    assert_eq!(query_value(&request, "ordering"), Some("-created_at"));
    assert_eq!(query_value(&request, "page"), Some("1"));
    assert_eq!(query_value(&request, "page_size"), Some("20"));
    assert_eq!(query_value(&request, "search"), None);

    let state = h.ctx.posts().snapshot().await;
    assert_eq!(state.posts.len(), 2);
    assert_eq!(state.pagination.count, 41);
    assert_eq!(state.pagination.total_pages(), 3);
}

#[tokio::test]
async fn test_call_site_params_do_not_persist() {
    let h = loaded().await;

    h.ctx
        .posts()
        .fetch_posts(PostQuery {
            search: Some("rust".to_string()),
            ..PostQuery::default()
        })
        .await
        .unwrap();

    let request = h.transport.last_request(Method::Get, POSTS).unwrap();
    assert_eq!(query_value(&request, "search"), Some("rust"));
    assert_eq!(h.ctx.posts().filters().await.search, "");
}

#[tokio::test]
async fn test_failed_fetch_empties_window() {
    let h = loaded().await;
    h.transport.reply(Method::Get, POSTS, 503, json!({"detail": "maintenance"}));

    let err = h
        .ctx
        .posts()
        .fetch_posts(PostQuery::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(h.ctx.posts().posts().await.is_empty());
}

#[tokio::test]
async fn test_set_filters_rewinds_to_first_page() {
    let h = loaded().await;
    h.ctx.posts().go_to_page(2).await.unwrap();
    let requests_before = h.transport.request_count();

    h.ctx
        .posts()
        .set_filters(PostQuery {
            author: Some(Some(5)),
            ..PostQuery::default()
        })
        .await;

    assert_eq!(h.ctx.posts().pagination().await.current_page, 1);
    assert_eq!(h.ctx.posts().filters().await.author, Some(5));
    assert_eq!(h.transport.request_count(), requests_before);
}

#[tokio::test]
async fn test_search_persists_and_refetches() {
    let h = loaded().await;

    h.ctx.posts().search_posts("tokio").await.unwrap();

    let request = h.transport.last_request(Method::Get, POSTS).unwrap();
    assert_eq!(query_value(&request, "search"), Some("tokio"));
    assert_eq!(query_value(&request, "page"), Some("1"));
    assert_eq!(h.ctx.posts().filters().await.search, "tokio");
}

#[tokio::test]
async fn test_category_filter_can_be_removed() {
    let h = loaded().await;

    h.ctx.posts().filter_by_category(Some(4)).await.unwrap();
    let request = h.transport.last_request(Method::Get, POSTS).unwrap();
    assert_eq!(query_value(&request, "category"), Some("4"));

    h.ctx.posts().filter_by_category(None).await.unwrap();
    let request = h.transport.last_request(Method::Get, POSTS).unwrap();
    assert_eq!(query_value(&request, "category"), None);
}

#[tokio::test]
async fn test_status_and_author_filters_can_be_cleared() {
    let h = loaded().await;
    h.ctx
        .posts()
        .set_filters(PostQuery {
            author: Some(Some(5)),
            ..PostQuery::default()
        })
        .await;

    h.ctx
        .posts()
        .set_filters(PostQuery {
            status: Some(None),
            author: Some(None),
            ..PostQuery::default()
        })
        .await;
    h.ctx.posts().fetch_posts(PostQuery::default()).await.unwrap();

    let request = h.transport.last_request(Method::Get, POSTS).unwrap();
    assert_eq!(query_value(&request, "status"), None);
    assert_eq!(query_value(&request, "author"), None);
    assert_eq!(h.ctx.posts().filters().await.status, None);
}

#[tokio::test]
async fn test_clear_filters_restores_defaults() {
    let h = loaded().await;
    h.ctx.posts().sort_posts("-views_count").await.unwrap();

    h.ctx.posts().clear_filters().await;

    let filters = h.ctx.posts().filters().await;
    assert_eq!(filters.ordering, "-created_at");
    assert_eq!(filters.status, Some(PostStatus::Published));
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_go_to_page_outside_range_is_noop() {
    let h = loaded().await;
    let requests_before = h.transport.request_count();

    assert!(h.ctx.posts().go_to_page(0).await.unwrap().is_none());
    assert!(h.ctx.posts().go_to_page(4).await.unwrap().is_none());

    assert_eq!(h.ctx.posts().pagination().await.current_page, 1);
    assert_eq!(h.transport.request_count(), requests_before);
}

#[tokio::test]
async fn test_next_page_follows_cursor() {
    let h = loaded().await;

    let page = h.ctx.posts().next_page().await.unwrap();

    assert!(page.is_some());
    let request = h.transport.last_request(Method::Get, POSTS).unwrap();
    assert_eq!(query_value(&request, "page"), Some("2"));
    assert_eq!(h.ctx.posts().pagination().await.current_page, 2);
}

#[tokio::test]
async fn test_previous_page_without_link_is_noop() {
    let h = loaded().await;

    assert!(h.ctx.posts().previous_page().await.unwrap().is_none());
    assert_eq!(h.transport.calls(Method::Get, POSTS), 1);
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_create_post_prepends_without_refetch() {
    let h = loaded().await;
    h.transport
        .reply(Method::Post, POSTS, 201, post_json(9, "brand-new", "published"));

    let created = h.ctx.posts().create_post(new_post("Brand new")).await.unwrap();

    let state = h.ctx.posts().snapshot().await;
    assert_eq!(created.map(|p| p.slug), Some("brand-new".to_string()));
    assert_eq!(state.posts[0].slug, "brand-new");
    assert_eq!(state.pagination.count, 42);
    assert_eq!(h.transport.calls(Method::Get, POSTS), 1);
}

#[tokio::test]
async fn test_create_post_with_image_is_multipart() {
    let h = loaded().await;
    h.transport
        .reply(Method::Post, POSTS, 201, post_json(9, "with-cover", "published"));

    h.ctx
        .posts()
        .create_post_with_image(
            new_post("With cover"),
            newsdesk_interaction::FormPart::file("image", "cover.png", vec![0x89, 0x50]),
        )
        .await
        .unwrap();

    let request = h.transport.last_request(Method::Post, POSTS).unwrap();
    assert!(matches!(
        request.body,
        newsdesk_interaction::RequestBody::Multipart(_)
    ));
    assert_eq!(h.ctx.posts().pagination().await.count, 42);
}

#[tokio::test]
async fn test_update_post_replaces_window_and_current() {
    let h = loaded().await;
    h.transport
        .reply(Method::Get, "/api/v1/posts/first/", 200, post_json(1, "first", "published"));
    h.ctx.posts().fetch_post_by_slug("first").await.unwrap();

    let mut updated = post_json(1, "first", "published");
    updated["title"] = json!("Renamed");
    h.transport
        .reply(Method::Patch, "/api/v1/posts/first/", 200, updated);

    h.ctx
        .posts()
        .update_post_partial(
            "first",
            PostPatch {
                title: Some("Renamed".to_string()),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();

    let state = h.ctx.posts().snapshot().await;
    assert_eq!(state.posts[0].title, "Renamed");
    assert_eq!(state.current_post.map(|p| p.title), Some("Renamed".to_string()));
}

#[tokio::test]
async fn test_create_echo_without_id_reloads_window() {
    let h = loaded().await;
    h.transport.reply(
        Method::Post,
        POSTS,
        201,
        json!({"title": "Brand new", "content": "body", "image": null, "category": null, "status": "published"}),
    );
    let mut fresh = post_json(9, "brand-new", "published");
    fresh["title"] = json!("Brand new");
    h.transport.reply(
        Method::Get,
        POSTS,
        200,
        page_json(42, vec![fresh, post_json(1, "first", "published")], None, None),
    );

    let created = h.ctx.posts().create_post(new_post("Brand new")).await.unwrap();

    assert_eq!(created.map(|p| p.id), Some(9));
    let state = h.ctx.posts().snapshot().await;
    assert_eq!(state.posts[0].slug, "brand-new");
    assert_eq!(state.pagination.count, 42);
    assert_eq!(h.transport.calls(Method::Get, POSTS), 2);
}

#[tokio::test]
async fn test_update_echo_merges_by_slug() {
    let h = loaded().await;
    h.transport
        .reply(Method::Get, "/api/v1/posts/first/", 200, post_json(1, "first", "published"));
    h.ctx.posts().fetch_post_by_slug("first").await.unwrap();
    h.transport.reply(
        Method::Patch,
        "/api/v1/posts/first/",
        200,
        json!({"title": "Post 1", "content": "edited", "image": null, "category": null, "status": "published"}),
    );

    let updated = h
        .ctx
        .posts()
        .update_post_partial(
            "first",
            PostPatch {
                content: Some("edited".to_string()),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, 1);
    assert_eq!(updated.slug, "first");
    let state = h.ctx.posts().snapshot().await;
    assert_eq!(state.posts[0].content, "edited");
    assert_eq!(state.current_post.map(|p| p.content), Some("edited".to_string()));
    assert_eq!(h.transport.calls(Method::Get, POSTS), 1);
}

#[tokio::test]
async fn test_retitle_without_slug_picks_up_new_slug() {
    let h = loaded().await;
    h.transport
        .reply(Method::Get, "/api/v1/posts/first/", 200, post_json(1, "first", "published"));
    h.ctx.posts().fetch_post_by_slug("first").await.unwrap();
    h.transport.reply(
        Method::Put,
        "/api/v1/posts/first/",
        200,
        json!({"title": "Renamed", "content": "body", "image": null, "category": null, "status": "published"}),
    );
    let mut renamed = post_json(1, "renamed", "published");
    renamed["title"] = json!("Renamed");
    h.transport
        .reply(Method::Get, POSTS, 200, page_json(41, vec![renamed], None, None));

    let updated = h
        .ctx
        .posts()
        .update_post("first", new_post("Renamed"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.slug, "renamed");
    assert_eq!(updated.title, "Renamed");
    let current = h.ctx.posts().current_post().await.unwrap();
    assert_eq!(current.slug, "renamed");
    assert_eq!(current.title, "Renamed");
    assert_eq!(h.transport.calls(Method::Get, POSTS), 2);
}

#[tokio::test]
async fn test_delete_post_removes_and_decrements() {
    let h = loaded().await;
    h.transport
        .reply(Method::Get, "/api/v1/posts/first/", 200, post_json(1, "first", "published"));
    h.ctx.posts().fetch_post_by_slug("first").await.unwrap();
    h.transport
        .reply_empty(Method::Delete, "/api/v1/posts/first/", 204);

    h.ctx.posts().delete_post("first").await.unwrap();

    let state = h.ctx.posts().snapshot().await;
    assert!(state.posts.iter().all(|p| p.slug != "first"));
    assert_eq!(state.pagination.count, 40);
    assert!(state.current_post.is_none());
}

#[tokio::test]
async fn test_missing_post_resets_current() {
    let h = loaded().await;
    h.transport
        .reply(Method::Get, "/api/v1/posts/first/", 200, post_json(1, "first", "published"));
    h.ctx.posts().fetch_post_by_slug("first").await.unwrap();

    let err = h.ctx.posts().fetch_post_by_slug("gone").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(h.ctx.posts().current_post().await.is_none());
}

#[tokio::test]
async fn test_forbidden_update_leaves_window_alone() {
    let h = loaded().await;
    h.transport.reply(
        Method::Put,
        "/api/v1/posts/first/",
        403,
        json!({"detail": "You do not have permission to perform this action."}),
    );

    let err = h
        .ctx
        .posts()
        .update_post("first", new_post("Nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, NewsdeskError::Forbidden(_)));
    assert_eq!(h.ctx.posts().posts().await[0].title, "Post 1");
}

// ============================================================================
// Derived views and categories
// ============================================================================

#[tokio::test]
async fn test_status_views() {
    let h = loaded().await;

    assert_eq!(h.ctx.posts().published_posts().await.len(), 1);
    assert_eq!(h.ctx.posts().draft_posts().await[0].slug, "draft-one");
    assert!(h.ctx.posts().post_from_cache("draft-one").await.is_some());
    assert!(h.ctx.posts().post_from_cache("missing").await.is_none());
}

#[tokio::test]
async fn test_categories_lifecycle() {
    let h = harness();
    h.transport.reply(
        Method::Get,
        "/api/v1/posts/categories/",
        200,
        page_json(1, vec![json!({"id": 1, "name": "Tech", "slug": "tech"})], None, None),
    );
    h.transport.reply(
        Method::Post,
        "/api/v1/posts/categories/",
        201,
        json!({"id": 2, "name": "Science", "slug": "science"}),
    );

    h.ctx.posts().fetch_categories(Vec::new()).await.unwrap();
    h.ctx
        .posts()
        .create_category(CategoryInput {
            name: "Science".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    let categories = h.ctx.posts().categories().await;
    assert_eq!(categories[0].slug, "science");
    assert_eq!(
        h.ctx.posts().category_by_id(1).await.map(|c| c.name),
        Some("Tech".to_string())
    );
}

#[tokio::test]
async fn test_posts_by_category_replace_window() {
    let h = loaded().await;
    h.transport.reply(
        Method::Get,
        "/api/v1/posts/categories/tech/posts/",
        200,
        json!({
            "category": {"id": 1, "name": "Tech", "slug": "tech"},
            "posts": [post_json(5, "tech-post", "published")]
        }),
    );

    let data = h
        .ctx
        .posts()
        .fetch_posts_by_category("tech", Vec::new())
        .await
        .unwrap();

    assert_eq!(data.category.map(|c| c.slug), Some("tech".to_string()));
    let posts = h.ctx.posts().posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].slug, "tech-post");
}
