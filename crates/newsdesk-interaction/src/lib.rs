//! Talks to the news site REST API.
//!
//! [`ApiGateway`] owns the request pipeline (bearer injection, the 401
//! refresh-and-retry policy, failure classification and notifications).
//! The `api` module groups the typed endpoints on top of it.

pub mod api;
pub mod gateway;
pub mod notification;
pub mod reqwest_transport;
pub mod session_state;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use gateway::{ApiGateway, RetryPolicy};
pub use notification::{Notification, NotificationLevel, NotificationSender};
pub use reqwest_transport::ReqwestTransport;
pub use session_state::SessionHandle;
pub use transport::{ApiRequest, ApiResponse, FormPart, Method, RequestBody, Transport};
