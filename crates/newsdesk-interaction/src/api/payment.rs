use std::sync::Arc;

use newsdesk_core::Result;
use newsdesk_core::pagination::ListResponse;
use newsdesk_core::subscription::{CheckoutRequest, CheckoutSession, Payment, PaymentId};

use crate::gateway::ApiGateway;

const CHECKOUT: &str = "/api/v1/payment/create-checkout-session/";
const HISTORY: &str = "/api/v1/payment/payments/history/";

fn payment_path(id: PaymentId, action: &str) -> String {
    format!("/api/v1/payment/payments/{}/{}/", id, action)
}

#[derive(Clone)]
pub struct PaymentApi {
    gateway: Arc<ApiGateway>,
}

impl PaymentApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        self.gateway.post_json(CHECKOUT, request).await
    }

    pub async fn status(&self, id: PaymentId) -> Result<Payment> {
        self.gateway.get_json(&payment_path(id, "status")).await
    }

    pub async fn history(&self) -> Result<Vec<Payment>> {
        let list: ListResponse<Payment> = self.gateway.get_json(HISTORY).await?;
        Ok(list.into_items())
    }

    pub async fn cancel(&self, id: PaymentId) -> Result<Payment> {
        self.gateway.post_empty(&payment_path(id, "cancel")).await
    }
}
