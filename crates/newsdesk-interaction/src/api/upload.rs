use std::sync::Arc;

use newsdesk_core::Result;
use serde::{Deserialize, Serialize};

use crate::gateway::ApiGateway;
use crate::transport::FormPart;

const UPLOAD_IMAGE: &str = "/api/v1/upload/image/";

/// Where the server stored an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl UploadedImage {
    pub fn location(&self) -> Option<&str> {
        self.url.as_deref().or(self.image.as_deref())
    }
}

#[derive(Clone)]
pub struct UploadApi {
    gateway: Arc<ApiGateway>,
}

impl UploadApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Uploads one file as the `image` part.
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadedImage> {
        self.gateway
            .post_multipart(UPLOAD_IMAGE, vec![FormPart::file("image", file_name, bytes)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_state::SessionHandle;
    use crate::testing::ScriptedTransport;
    use crate::transport::{Method, RequestBody};
    use newsdesk_infrastructure::MemoryCredentialStore;

    #[tokio::test]
    async fn test_upload_sends_single_image_part() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(
            Method::Post,
            UPLOAD_IMAGE,
            201,
            serde_json::json!({"url": "/media/posts/cover.png"}),
        );
        let gateway = Arc::new(ApiGateway::new(
            transport.clone(),
            SessionHandle::new(Arc::new(MemoryCredentialStore::new())),
        ));

        let uploaded = UploadApi::new(gateway)
            .upload_image("cover.png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(uploaded.location(), Some("/media/posts/cover.png"));
        let request = transport.last_request(Method::Post, UPLOAD_IMAGE).unwrap();
        match request.body {
            RequestBody::Multipart(parts) => {
                assert_eq!(parts.len(), 1);
                assert_eq!(parts[0].name, "image");
                assert_eq!(parts[0].content_type.as_deref(), Some("image/png"));
            }
            other => panic!("Expected multipart body, got {:?}", other),
        }
    }
}
