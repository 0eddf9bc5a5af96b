mod common;

use common::*;
use newsdesk_core::NewsdeskError;
use newsdesk_interaction::Method;
use serde_json::json;

const STATUS: &str = "/api/v1/subscribe/status/";
const PLANS: &str = "/api/v1/subscribe/plans/";
const PIN: &str = "/api/v1/subscribe/pin-post/";
const UNPIN: &str = "/api/v1/subscribe/unpin-post/";
const CANCEL: &str = "/api/v1/subscribe/cancel/";
const CHECKOUT: &str = "/api/v1/payment/create-checkout-session/";

async fn subscribed() -> Harness {
    let h = signed_in().await;
    h.transport.reply(
        Method::Get,
        STATUS,
        200,
        json!({
            "has_subscription": true,
            "is_active": true,
            "subscription": subscription_json(true),
            "pinned_post": pinned_json(42),
            "can_pin_posts": true
        }),
    );
    h.ctx
        .subscription()
        .fetch_subscription_status()
        .await
        .unwrap();
    h
}

#[tokio::test]
async fn test_status_mirrors_subscription_and_pin() {
    let h = subscribed().await;
    let store = h.ctx.subscription();

    assert!(store.has_subscription().await);
    assert!(store.is_active().await);
    assert!(store.can_pin_posts().await);
    assert_eq!(store.days_remaining().await, 12);
    assert_eq!(store.plan_info().await.map(|p| p.name), Some("Monthly".to_string()));
    assert_eq!(store.pinned_post_info().await.map(|p| p.id), Some(42));
}

#[tokio::test]
async fn test_status_404_is_empty_state() {
    let h = subscribed().await;
    h.transport
        .reply(Method::Get, STATUS, 404, json!({"detail": "Not found."}));

    let status = h
        .ctx
        .subscription()
        .fetch_subscription_status()
        .await
        .unwrap();

    assert!(status.subscription.is_none());
    assert!(status.pinned_post.is_none());
    assert!(!h.ctx.subscription().has_subscription().await);
    assert!(h.ctx.subscription().pinned_post().await.is_none());
}

#[tokio::test]
async fn test_status_failure_resets_and_propagates() {
    let h = subscribed().await;
    h.transport.reply(Method::Get, STATUS, 500, json!({}));

    let err = h
        .ctx
        .subscription()
        .fetch_subscription_status()
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(h.ctx.subscription().subscription().await.is_none());
}

#[tokio::test]
async fn test_pin_and_unpin_mirror_remote() {
    let h = signed_in().await;
    h.transport.reply(Method::Post, PIN, 201, pinned_json(8));
    h.transport.reply(Method::Post, UNPIN, 200, json!({"message": "unpinned"}));

    h.ctx.subscription().pin_post(8).await.unwrap();
    assert_eq!(h.ctx.subscription().pinned_post().await.map(|p| p.post), Some(8));
    assert_eq!(
        h.transport.last_request(Method::Post, PIN).unwrap().json_body(),
        Some(&json!({"post_id": 8}))
    );

    h.ctx.subscription().unpin_post().await.unwrap();
    assert!(h.ctx.subscription().pinned_post().await.is_none());
}

#[tokio::test]
async fn test_pin_rejected_by_server_keeps_state() {
    let h = subscribed().await;
    h.transport.reply(
        Method::Post,
        PIN,
        400,
        json!({"error": "An active subscription is required"}),
    );

    let err = h.ctx.subscription().pin_post(9).await.unwrap_err();

    assert_eq!(err.user_message(), "An active subscription is required");
    assert_eq!(h.ctx.subscription().pinned_post().await.map(|p| p.post), Some(42));
}

#[tokio::test]
async fn test_pin_requires_post_id() {
    let h = signed_in().await;

    let err = h.ctx.subscription().pin_post(0).await.unwrap_err();

    assert!(matches!(err, NewsdeskError::InvalidArgument(_)));
    assert_eq!(h.transport.calls(Method::Post, PIN), 0);
}

#[tokio::test]
async fn test_cancel_clears_subscription_and_pin() {
    let h = subscribed().await;
    h.transport.reply(Method::Post, CANCEL, 200, json!({"message": "cancelled"}));

    h.ctx.subscription().cancel_subscription().await.unwrap();

    assert!(h.ctx.subscription().subscription().await.is_none());
    assert!(h.ctx.subscription().pinned_post().await.is_none());
}

#[tokio::test]
async fn test_failed_cancel_keeps_state() {
    let h = subscribed().await;
    h.transport.reply(Method::Post, CANCEL, 500, json!({}));

    assert!(h.ctx.subscription().cancel_subscription().await.is_err());
    assert!(h.ctx.subscription().has_subscription().await);
}

#[tokio::test]
async fn test_plans_accept_paginated_response() {
    let h = harness();
    h.transport.reply(
        Method::Get,
        PLANS,
        200,
        page_json(
            2,
            vec![
                json!({"id": 1, "name": "Monthly", "price": "9.99", "duration_days": 30}),
                json!({"id": 2, "name": "Yearly", "price": "99.00", "duration_days": 365}),
            ],
            None,
            None,
        ),
    );

    let plans = h.ctx.subscription().fetch_plans().await.unwrap();

    assert_eq!(plans.len(), 2);
    assert_eq!(h.ctx.subscription().plans().await[1].name, "Yearly");
}

#[tokio::test]
async fn test_checkout_uses_app_origin() {
    let h = signed_in().await;
    h.transport.reply(
        Method::Post,
        CHECKOUT,
        200,
        json!({"checkout_url": "https://checkout.example/cs_1", "session_id": "cs_1", "payment_id": 5}),
    );

    let session = h
        .ctx
        .subscription()
        .create_checkout_session(1)
        .await
        .unwrap();

    assert_eq!(session.checkout_url, "https://checkout.example/cs_1");
    assert_eq!(
        h.transport.last_request(Method::Post, CHECKOUT).unwrap().json_body(),
        Some(&json!({
            "subscription_plan_id": 1,
            "success_url": "https://news.example/subscription/success",
            "cancel_url": "https://news.example/subscription/cancel"
        }))
    );
}

#[tokio::test]
async fn test_reset_forgets_everything() {
    let h = subscribed().await;

    h.ctx.subscription().reset().await;

    let snapshot = h.ctx.subscription().snapshot().await;
    assert!(snapshot.subscription.is_none());
    assert!(snapshot.pinned_post.is_none());
    assert!(snapshot.plans.is_empty());
}
