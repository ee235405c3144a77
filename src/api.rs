//! Remote API abstraction
//!
//! `ApiService` is the seam every remote call goes through: handlers build a `Request`,
//! the service resolves it against the configured base URL and returns a JSON `Response`.
//! `ApiRequestHandler` is the common shape of the SDK's request/response handlers.

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod http;

pub use http::HttpApiService;

/// A request/response handler.
#[async_trait]
pub trait ApiRequestHandler<Req, Res>: Send + Sync
where
    Req: Send + 'static,
{
    async fn handle(&self, request: Req) -> Result<Res, ApiError>;
}

/// HTTP verb for a remote request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpRequestType {
    Get,
    Post,
    Patch,
}

/// A remote API request relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub request_type: HttpRequestType,
    pub path: String,
    pub body: Option<Value>,
    pub with_api_token: bool,
    pub with_session_token: bool,
}

impl Request {
    pub fn new(request_type: HttpRequestType, path: impl Into<String>) -> Self {
        Self {
            request_type,
            path: path.into(),
            body: None,
            with_api_token: false,
            with_session_token: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpRequestType::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpRequestType::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpRequestType::Patch, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_api_token(mut self, required: bool) -> Self {
        self.with_api_token = required;
        self
    }

    pub fn with_session_token(mut self, required: bool) -> Self {
        self.with_session_token = required;
        self
    }
}

/// A successful remote response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    /// Look up `body.result.<field>` and deserialize it.
    pub fn result_field<T: serde::de::DeserializeOwned>(&self, field: &str) -> Result<T, ApiError> {
        let value = self
            .body
            .get("result")
            .and_then(|result| result.get(field))
            .cloned()
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!("response has no result.{}", field))
            })?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("result.{}: {}", field, e)))
    }
}

/// Executes remote requests.
#[async_trait]
pub trait ApiService: Send + Sync {
    async fn fetch(&self, request: Request) -> Result<Response, ApiError>;
}
