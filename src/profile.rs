//! Profiles: content access records, managed (child) profiles and profile import.

use crate::error::ApiError;
use crate::key_value_store::CacheStrategy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod content_access;
pub mod import;
pub mod managed;

pub use content_access::SledContentAccessStore;
pub use managed::ManagedProfileManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Student,
    Teacher,
    Administrator,
    Parent,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    Local,
    Server,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootOrg {
    #[serde(default)]
    pub hash_tag_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User record as held by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tnc_latest_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_org: Option<RootOrg>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Local profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: String,
    pub handle: String,
    pub profile_type: ProfileType,
    pub source: ProfileSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_profile: Option<ServerProfile>,
}

/// The currently active profile session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSession {
    pub uid: String,
    pub sid: String,
    pub created_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerProfileDetailsRequest {
    pub user_id: String,
    pub required_fields: Vec<String>,
    pub from: CacheStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptTermsConditionRequest {
    pub user_id: String,
    pub version: String,
}

/// Local and remote profile operations the managed-profile flows build on.
#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_active_session_profile(&self) -> Result<Profile, ApiError>;
    async fn get_active_profile_session(&self) -> Result<ProfileSession, ApiError>;
    async fn set_active_session_for_profile(&self, uid: &str) -> Result<bool, ApiError>;
    async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, ApiError>;
    async fn create_profile(&self, profile: Profile) -> Result<Profile, ApiError>;
    async fn get_server_profiles_details(
        &self,
        request: ServerProfileDetailsRequest,
    ) -> Result<ServerProfile, ApiError>;
    async fn accept_terms_and_conditions(
        &self,
        request: AcceptTermsConditionRequest,
    ) -> Result<bool, ApiError>;
}

/// Authenticated session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user_token: String,
    /// Parent account when the session belongs to a managed profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn get_session(&self) -> Result<Option<OAuthSession>, ApiError>;
    async fn set_session(&self, session: OAuthSession) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentAccessStatus {
    NotPlayed,
    Played,
}

/// Record that a user opened a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAccess {
    pub uid: String,
    pub content_id: String,
    pub content_type: String,
    pub status: ContentAccessStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed_on: Option<u64>,
}

#[async_trait]
pub trait ContentAccessService: Send + Sync {
    async fn add_content_access(&self, access: ContentAccess) -> Result<bool, ApiError>;
    async fn get_content_accesses(&self, uid: &str) -> Result<Vec<ContentAccess>, ApiError>;
}
