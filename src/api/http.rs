//! reqwest-backed `ApiService`.

use crate::api::{ApiService, HttpRequestType, Request, Response};
use crate::config::ApiConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        ApiError::HttpStatus {
            status: status.as_u16(),
            body: error.to_string(),
        }
    } else if error.is_timeout() {
        ApiError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::RequestFailed(format!("Connection error: {}", error))
    } else if error.is_decode() {
        ApiError::InvalidResponse(format!("Failed to decode response: {}", error))
    } else {
        ApiError::RequestFailed(format!("HTTP error: {}", error))
    }
}

/// Remote API client for the configured base URL.
pub struct HttpApiService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    user_token: Option<String>,
}

impl HttpApiService {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            user_token: config.user_token.clone(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl ApiService for HttpApiService {
    async fn fetch(&self, request: Request) -> Result<Response, ApiError> {
        let url = self.url_for(&request.path);
        debug!(method = ?request.request_type, url = %url, "api request");

        let mut builder = match request.request_type {
            HttpRequestType::Get => self.client.get(&url),
            HttpRequestType::Post => self.client.post(&url),
            HttpRequestType::Patch => self.client.patch(&url),
        };

        if request.with_api_token {
            let token = self.api_token.as_deref().ok_or_else(|| {
                ApiError::ConfigError("api_token is required for this request".to_string())
            })?;
            builder = builder.bearer_auth(token);
        }
        if request.with_session_token {
            let token = self.user_token.as_deref().ok_or(ApiError::NoActiveSession)?;
            builder = builder.header("X-Authenticated-User-Token", token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_http_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.json().await.map_err(map_http_error)?;
        Ok(Response {
            status: status.as_u16(),
            body,
        })
    }
}
