//! Endpoint groups against a scripted transport: paths, payload shapes and
//! the per-endpoint 401 policy.

use std::sync::Arc;

use newsdesk_core::credentials::StoredCredentials;
use newsdesk_core::user::{LoginRequest, UserProfile};
use newsdesk_infrastructure::MemoryCredentialStore;
use newsdesk_interaction::api::{AuthApi, CategoriesApi, CommentsApi, SubscriptionApi};
use newsdesk_interaction::notification::{self, NotificationReceiver};
use newsdesk_interaction::testing::ScriptedTransport;
use newsdesk_interaction::{ApiGateway, Method, SessionHandle};
use serde_json::json;

const REFRESH: &str = "/api/v1/auth/token/refresh/";

struct Fixture {
    transport: Arc<ScriptedTransport>,
    gateway: Arc<ApiGateway>,
    notifications: NotificationReceiver,
}

async fn fixture(signed_in: bool) -> Fixture {
    let transport = Arc::new(ScriptedTransport::new());
    let session = SessionHandle::new(Arc::new(MemoryCredentialStore::new()));
    if signed_in {
        let user: UserProfile = serde_json::from_value(json!({"id": 5, "username": "mira"})).unwrap();
        session
            .adopt(user, StoredCredentials::new("access-5", "refresh-5"))
            .await;
    }
    let (sender, notifications) = notification::channel();
    let gateway = Arc::new(ApiGateway::new(transport.clone(), session).with_notifier(sender));

    Fixture {
        transport,
        gateway,
        notifications,
    }
}

#[tokio::test]
async fn test_bad_login_does_not_refresh_or_sign_out() {
    let mut f = fixture(true).await;
    f.transport.reply(
        Method::Post,
        "/api/v1/auth/login/",
        401,
        json!({"detail": "No active account found"}),
    );

    let err = AuthApi::new(f.gateway.clone())
        .login(&LoginRequest {
            email: "mira@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(err.is_authentication_required());
    assert_eq!(f.transport.calls(Method::Post, REFRESH), 0);
    assert!(f.gateway.session().is_authenticated());
    assert!(f.notifications.try_recv().is_err());
}

#[tokio::test]
async fn test_logout_sends_refresh_token_in_body() {
    let f = fixture(true).await;
    f.transport
        .reply_empty(Method::Post, "/api/v1/auth/logout/", 205);

    AuthApi::new(f.gateway.clone())
        .logout("refresh-5")
        .await
        .unwrap();

    let request = f
        .transport
        .last_request(Method::Post, "/api/v1/auth/logout/")
        .unwrap();
    assert_eq!(request.json_body(), Some(&json!({"refresh_token": "refresh-5"})));
    assert_eq!(request.bearer.as_deref(), Some("access-5"));
}

#[tokio::test]
async fn test_plans_accept_plain_and_paged_lists() {
    let f = fixture(false).await;
    let api = SubscriptionApi::new(f.gateway.clone());
    let plan = json!({"id": 1, "name": "Monthly", "price": "9.99", "duration_days": 30});

    f.transport
        .reply(Method::Get, "/api/v1/subscribe/plans/", 200, json!([plan.clone()]));
    f.transport.reply(
        Method::Get,
        "/api/v1/subscribe/plans/",
        200,
        json!({"count": 1, "next": null, "previous": null, "results": [plan]}),
    );

    let plain = api.plans().await.unwrap();
    let paged = api.plans().await.unwrap();

    assert_eq!(plain, paged);
    assert_eq!(plain[0].name, "Monthly");
}

#[tokio::test]
async fn test_can_pin_targets_post_path() {
    let f = fixture(true).await;
    f.transport.reply(
        Method::Get,
        "/api/v1/subscribe/can-pin/42/",
        200,
        json!({"post_id": 42, "can_pin": false, "message": "Only your own posts can be pinned"}),
    );

    let answer = SubscriptionApi::new(f.gateway.clone())
        .can_pin(42)
        .await
        .unwrap();

    assert!(!answer.can_pin);
    assert_eq!(answer.message, "Only your own posts can be pinned");
}

#[tokio::test]
async fn test_comment_paths() {
    let f = fixture(false).await;
    let api = CommentsApi::new(f.gateway.clone());
    f.transport.reply(
        Method::Get,
        "/api/v1/comments/post/7/",
        200,
        json!({"comments": [], "comments_count": 0}),
    );
    f.transport
        .reply(Method::Get, "/api/v1/comments/3/replies/", 200, json!({"replies": []}));

    let for_post = api.for_post(7).await.unwrap();
    let replies = api.replies(3).await.unwrap();

    assert_eq!(for_post.comments_count, Some(0));
    assert!(replies.replies.is_empty());
    assert_eq!(f.transport.request_count(), 2);
}

#[tokio::test]
async fn test_category_posts_forward_query() {
    let f = fixture(false).await;
    f.transport.reply(
        Method::Get,
        "/api/v1/posts/categories/rust/posts/",
        200,
        json!({"category": {"id": 2, "name": "Rust", "slug": "rust"}, "posts": []}),
    );

    let listing = CategoriesApi::new(f.gateway.clone())
        .posts("rust", vec![("page".to_string(), "2".to_string())])
        .await
        .unwrap();

    assert_eq!(listing.category.map(|c| c.slug).as_deref(), Some("rust"));
    let request = f
        .transport
        .last_request(Method::Get, "/api/v1/posts/categories/rust/posts/")
        .unwrap();
    assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
}

#[tokio::test]
async fn test_server_error_is_notified() {
    let mut f = fixture(false).await;
    f.transport.reply(
        Method::Get,
        "/api/v1/subscribe/pinned-posts/",
        503,
        json!({"detail": "maintenance"}),
    );

    let err = SubscriptionApi::new(f.gateway.clone())
        .pinned_posts()
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    let notice = f.notifications.try_recv().unwrap();
    assert_eq!(notice.message, "Internal server error. Please try again later.");
}
