use std::sync::Arc;

use newsdesk_core::Result;
use newsdesk_core::user::{
    AuthResponse, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile,
};
use serde::de::IgnoredAny;

use crate::gateway::{ApiGateway, RetryPolicy};
use crate::transport::{ApiRequest, Method};

const LOGIN: &str = "/api/v1/auth/login/";
const REGISTER: &str = "/api/v1/auth/register/";
const LOGOUT: &str = "/api/v1/auth/logout/";
const PROFILE: &str = "/api/v1/auth/profile/";
const CHANGE_PASSWORD: &str = "/api/v1/auth/change-password/";

#[derive(Clone)]
pub struct AuthApi {
    gateway: Arc<ApiGateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Bad credentials answer 401; that must not touch the session, so the
    /// refresh policy is off.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        self.gateway
            .send_json(Method::Post, LOGIN, credentials, RetryPolicy::Never)
            .await
    }

    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse> {
        self.gateway
            .send_json(Method::Post, REGISTER, data, RetryPolicy::Never)
            .await
    }

    /// Blacklists `refresh_token` on the server.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let _: IgnoredAny = self
            .gateway
            .send_json(Method::Post, LOGOUT, &body, RetryPolicy::Never)
            .await?;
        Ok(())
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.gateway.get_json(PROFILE).await
    }

    /// Profile fetch with an explicit 401 policy.
    pub async fn profile_with_policy(&self, policy: RetryPolicy) -> Result<UserProfile> {
        let response = self
            .gateway
            .request_with_policy(ApiRequest::get(PROFILE), policy)
            .await?;
        response.json()
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.gateway.put_json(PROFILE, update).await
    }

    pub async fn update_profile_partial(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.gateway.patch_json(PROFILE, update).await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        let _: IgnoredAny = self.gateway.put_json(CHANGE_PASSWORD, request).await?;
        Ok(())
    }
}
