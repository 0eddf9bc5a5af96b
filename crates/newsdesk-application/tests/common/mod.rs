#![allow(dead_code)]

use std::sync::Arc;

use newsdesk_application::AppContext;
use newsdesk_core::config::ClientConfig;
use newsdesk_core::credentials::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use newsdesk_core::user::LoginRequest;
use newsdesk_infrastructure::MemoryCredentialStore;
use newsdesk_interaction::Method;
use newsdesk_interaction::notification::NotificationReceiver;
use newsdesk_interaction::testing::ScriptedTransport;
use serde_json::{Value, json};

pub const LOGIN: &str = "/api/v1/auth/login/";
pub const LOGOUT: &str = "/api/v1/auth/logout/";
pub const PROFILE: &str = "/api/v1/auth/profile/";
pub const REFRESH: &str = "/api/v1/auth/token/refresh/";
pub const POSTS: &str = "/api/v1/posts/";
pub const COMMENTS: &str = "/api/v1/comments/";

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub ctx: AppContext,
    pub notifications: NotificationReceiver,
}

pub fn harness() -> Harness {
    harness_with(ScriptedTransport::new(), MemoryCredentialStore::new())
}

pub fn harness_with(transport: ScriptedTransport, credentials: MemoryCredentialStore) -> Harness {
    let transport = Arc::new(transport);
    let credentials = Arc::new(credentials);
    let config = ClientConfig {
        app_origin: "https://news.example".to_string(),
        ..ClientConfig::default()
    };
    let (ctx, notifications) =
        AppContext::with_notifications(config, transport.clone(), credentials.clone());

    Harness {
        transport,
        credentials,
        ctx,
        notifications,
    }
}

/// A harness whose credential store already holds a token pair.
pub fn harness_with_stored_tokens(access: &str, refresh: &str) -> Harness {
    harness_with(
        ScriptedTransport::new(),
        MemoryCredentialStore::with_entries([(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)]),
    )
}

/// Logs in as `alice` (id 1) with tokens `access-1` / `refresh-1`.
pub async fn signed_in() -> Harness {
    let h = harness();
    h.transport.reply(
        Method::Post,
        LOGIN,
        200,
        json!({"user": user_json(1, "alice"), "access": "access-1", "refresh": "refresh-1"}),
    );
    h.ctx
        .session()
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("login should succeed");
    h
}

// ============================================================================
// JSON fixtures
// ============================================================================

pub fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{}@example.com", username),
        "is_staff": false,
        "is_superuser": false
    })
}

pub fn post_json(id: i64, slug: &str, status: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "title": format!("Post {}", id),
        "content": "body",
        "author": 1,
        "status": status,
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:00Z"
    })
}

pub fn page_json(count: u64, results: Vec<Value>, next: Option<&str>, previous: Option<&str>) -> Value {
    json!({"count": count, "next": next, "previous": previous, "results": results})
}

/// `minute` sets the creation time within a fixed hour.
pub fn comment_json(id: i64, parent: Option<i64>, minute: u32, replies_count: u32) -> Value {
    json!({
        "id": id,
        "content": format!("comment {}", id),
        "author": 1,
        "parent": parent,
        "post": 7,
        "is_active": true,
        "replies_count": replies_count,
        "is_reply": parent.is_some(),
        "created_at": format!("2024-03-01T10:{:02}:00Z", minute)
    })
}

pub fn subscription_json(active: bool) -> Value {
    json!({
        "id": 3,
        "plan": 1,
        "plan_info": {"id": 1, "name": "Monthly", "price": "9.99", "duration_days": 30},
        "status": if active { "active" } else { "expired" },
        "start_date": "2024-03-01T00:00:00Z",
        "end_date": "2024-03-31T00:00:00Z",
        "is_active": active,
        "days_remaining": 12
    })
}

pub fn pinned_json(post: i64) -> Value {
    json!({
        "id": 11,
        "post": post,
        "post_info": {"id": post, "title": "Pinned", "slug": "pinned"},
        "pinned_at": "2024-03-02T00:00:00Z"
    })
}
