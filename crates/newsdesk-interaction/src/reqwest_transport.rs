//! Production [`Transport`] backed by `reqwest`.

use async_trait::async_trait;
use newsdesk_core::config::ClientConfig;
use newsdesk_core::{NewsdeskError, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::multipart::{Form, Part};

use crate::transport::{ApiRequest, ApiResponse, FormPart, Method, RequestBody, Transport};

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Builds a client with the configured base URL and request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| NewsdeskError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        match &part.file_name {
            Some(file_name) => {
                let mut file = Part::bytes(part.bytes.clone()).file_name(file_name.clone());
                if let Some(content_type) = &part.content_type {
                    file = file.mime_str(content_type).map_err(map_reqwest_error)?;
                }
                form = form.part(part.name.clone(), file);
            }
            None => {
                let value = String::from_utf8_lossy(&part.bytes).into_owned();
                form = form.text(part.name.clone(), value);
            }
        }
    }
    Ok(form)
}

/// Maps a transport-level failure onto the client error type.
pub fn map_reqwest_error(err: reqwest::Error) -> NewsdeskError {
    if err.is_connect() || err.is_timeout() {
        NewsdeskError::Network(err.to_string())
    } else if err.is_builder() {
        NewsdeskError::MalformedRequest(err.to_string())
    } else {
        NewsdeskError::Network(err.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), self.url(&request.path))
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => {
                builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let config = ClientConfig {
            api_base_url: "http://api.local:8000/".to_string(),
            ..ClientConfig::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/api/v1/posts/"),
            "http://api.local:8000/api/v1/posts/"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let config = ClientConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ClientConfig::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();

        let err = transport
            .send(&ApiRequest::get("/api/v1/posts/"))
            .await
            .unwrap_err();
        assert!(matches!(err, NewsdeskError::Network(_)), "got {:?}", err);
    }
}
