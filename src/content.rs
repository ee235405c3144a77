//! Content details and content markers.

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod service;

pub use service::HttpContentService;

/// Mime types the completion rules distinguish.
pub struct MimeType;

impl MimeType {
    pub const VIDEO: &'static str = "video/mp4";
    pub const YOUTUBE: &'static str = "video/x-youtube";
    pub const WEBM: &'static str = "video/webm";
    pub const H5P: &'static str = "application/vnd.ekstep.h5p-archive";
    pub const HTML: &'static str = "application/vnd.ekstep.html-archive";
    pub const ECML: &'static str = "application/vnd.ekstep.ecml-archive";
    pub const PDF: &'static str = "application/pdf";
}

/// Content metadata as returned by the content read API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub identifier: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub content_data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDetailRequest {
    pub content_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkerType {
    Previewed,
}

impl MarkerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerType::Previewed => "PREVIEWED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMarkerRequest {
    pub uid: String,
    pub content_id: String,
    /// Serialized content data at the time of marking
    pub data: String,
    pub marker: MarkerType,
    pub is_marked: bool,
    #[serde(default)]
    pub extra_info: Map<String, Value>,
}

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn get_content_details(&self, request: ContentDetailRequest)
        -> Result<Content, ApiError>;
    async fn set_content_marker(&self, request: ContentMarkerRequest) -> Result<bool, ApiError>;
}
