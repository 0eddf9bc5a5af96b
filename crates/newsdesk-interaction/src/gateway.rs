//! The request pipeline every API call goes through.
//!
//! # Retry policy
//!
//! A 401 on an attempt that has not been retried triggers at most one token
//! refresh followed by one re-issue of the original request. The attempt
//! number travels in a [`RequestContext`] owned by the pipeline, never on the
//! request itself, so a retried request can not loop.
//!
//! | situation                        | outcome                                        |
//! |----------------------------------|------------------------------------------------|
//! | 401, no refresh token            | session cleared, `AuthenticationRequired`      |
//! | 401, refresh succeeds            | new access token adopted, request re-issued    |
//! | 401, refresh fails               | session cleared, `AuthenticationRequired`      |
//! | 401 on the re-issued request     | `AuthenticationRequired`, nothing else happens |

use std::sync::Arc;

use newsdesk_core::user::RefreshResponse;
use newsdesk_core::{NewsdeskError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::notification::{Notification, NotificationSender};
use crate::session_state::SessionHandle;
use crate::transport::{ApiRequest, ApiResponse, FormPart, Method, Transport};

pub const REFRESH_PATH: &str = "/api/v1/auth/token/refresh/";

/// Whether a 401 may be answered with a refresh and one retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    #[default]
    RetryOnce,
    /// 401 is returned as `AuthenticationRequired` untouched; the caller
    /// owns recovery.
    Never,
}

#[derive(Debug, Clone, Copy)]
struct RequestContext {
    id: Uuid,
    attempt: u32,
    policy: RetryPolicy,
}

impl RequestContext {
    fn new(policy: RetryPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt: 0,
            policy,
        }
    }

    fn may_refresh(&self) -> bool {
        self.policy == RetryPolicy::RetryOnce && self.attempt == 0
    }

    fn retried(self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self
        }
    }
}

pub struct ApiGateway {
    transport: Arc<dyn Transport>,
    session: SessionHandle,
    notifier: Option<NotificationSender>,
}

impl ApiGateway {
    pub fn new(transport: Arc<dyn Transport>, session: SessionHandle) -> Self {
        Self {
            transport,
            session,
            notifier: None,
        }
    }

    /// Publishes a [`Notification`] for every terminal failure.
    pub fn with_notifier(mut self, notifier: NotificationSender) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn notify(&self, notification: Notification) {
        if let Some(notifier) = &self.notifier {
            // A dropped receiver only means nobody is listening.
            let _ = notifier.send(notification);
        }
    }

    fn fail<T>(&self, err: NewsdeskError) -> Result<T> {
        self.notify(Notification::from_error(&err));
        Err(err)
    }

    // ============================================================================
    // Pipeline
    // ============================================================================

    /// Sends `request` with the default retry-once policy.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.request_with_policy(request, RetryPolicy::RetryOnce)
            .await
    }

    pub async fn request_with_policy(
        &self,
        request: ApiRequest,
        policy: RetryPolicy,
    ) -> Result<ApiResponse> {
        let mut ctx = RequestContext::new(policy);

        loop {
            let outgoing = request.clone().with_bearer(self.session.access_token());
            tracing::debug!(
                request_id = %ctx.id,
                attempt = ctx.attempt,
                "[Gateway] {} {}",
                outgoing.method,
                outgoing.path
            );

            let response = match self.transport.send(&outgoing).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(request_id = %ctx.id, "[Gateway] {} {} failed: {}", outgoing.method, outgoing.path, err);
                    return self.fail(err);
                }
            };

            if response.is_success() {
                return Ok(response);
            }

            if response.status != 401 {
                let err = response.error();
                tracing::warn!(
                    request_id = %ctx.id,
                    status = response.status,
                    "[Gateway] {} {} rejected: {}",
                    outgoing.method,
                    outgoing.path,
                    err
                );
                return self.fail(err);
            }

            if ctx.policy == RetryPolicy::Never {
                return Err(NewsdeskError::AuthenticationRequired);
            }

            if !ctx.may_refresh() {
                tracing::warn!(request_id = %ctx.id, "[Gateway] 401 after token refresh, giving up");
                return self.fail(NewsdeskError::AuthenticationRequired);
            }

            if self.session.refresh_token().is_none() {
                tracing::info!(request_id = %ctx.id, "[Gateway] 401 without refresh token, clearing session");
                self.session.clear().await;
                return self.fail(NewsdeskError::AuthenticationRequired);
            }

            match self.refresh_access_token().await {
                Ok(_) => {
                    tracing::debug!(request_id = %ctx.id, "[Gateway] Token refreshed, retrying");
                    ctx = ctx.retried();
                }
                Err(err) => {
                    tracing::info!(request_id = %ctx.id, "[Gateway] Token refresh failed: {}", err);
                    self.notify(Notification::session_expired());
                    return Err(NewsdeskError::AuthenticationRequired);
                }
            }
        }
    }

    /// Exchanges the held refresh token for a new access token.
    ///
    /// Success replaces only the access token. Failure clears the whole
    /// session and returns the refresh error.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let Some(refresh) = self.session.refresh_token() else {
            return Err(NewsdeskError::NoRefreshToken);
        };

        let request =
            ApiRequest::post(REFRESH_PATH).with_json(&serde_json::json!({ "refresh": refresh }))?;

        let outcome = async {
            let response = self.transport.send(&request).await?;
            if !response.is_success() {
                return Err(response.error());
            }
            response.json::<RefreshResponse>()
        }
        .await;

        match outcome {
            Ok(refreshed) => {
                self.session.set_access_token(refreshed.access.clone()).await;
                tracing::info!("[Gateway] Access token refreshed");
                Ok(refreshed.access)
            }
            Err(err) => {
                self.session.clear().await;
                Err(err)
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, response: &ApiResponse) -> Result<T> {
        match response.json() {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!("[Gateway] Unexpected response body: {}", err);
                self.fail(err)
            }
        }
    }

    // ============================================================================
    // Typed helpers
    // ============================================================================

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_with(path, Vec::new()).await
    }

    pub async fn get_json_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        let response = self
            .request(ApiRequest::get(path).with_query(query))
            .await?;
        self.decode(&response)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Post, path, body, RetryPolicy::RetryOnce)
            .await
    }

    /// POST without a body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(ApiRequest::post(path)).await?;
        self.decode(&response)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Put, path, body, RetryPolicy::RetryOnce)
            .await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::Patch, path, body, RetryPolicy::RetryOnce)
            .await
    }

    /// Any JSON method with an explicit retry policy.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        policy: RetryPolicy,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(method, path).with_json(body)?;
        let response = self.request_with_policy(request, policy).await?;
        self.decode(&response)
    }

    /// DELETE; the response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(ApiRequest::new(Method::Delete, path)).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T> {
        let response = self
            .request(ApiRequest::post(path).with_multipart(parts))
            .await?;
        self.decode(&response)
    }
}
