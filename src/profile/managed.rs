//! Managed profiles: child accounts created and switched to by a logged-in parent.

use crate::api::{ApiService, Request};
use crate::error::ApiError;
use crate::framework::FrameworkService;
use crate::key_value_store::cached_item_store::CacheKey;
use crate::key_value_store::{CacheStrategy, CachedItemStore};
use crate::profile::{
    AcceptTermsConditionRequest, AuthService, OAuthSession, Profile, ProfileService,
    ProfileSource, ProfileType, ServerProfile, ServerProfileDetailsRequest,
};
use crate::telemetry::{now_millis, SessionTelemetry, TelemetryService};
use futures::FutureExt;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

const MANAGED_PROFILES_KEY: &str = "managed_profiles-";
const MANAGED_PROFILES_TTL_KEY: &str = "ttl_managed_profiles-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddManagedProfileRequest {
    pub first_name: String,
    pub managed_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetManagedServerProfilesRequest {
    pub from: CacheStrategy,
    pub required_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedProfileSwitchRequest {
    pub uid: String,
}

/// Collaborators of `ManagedProfileManager`.
pub struct ManagedProfileDeps {
    pub profile_service: Arc<dyn ProfileService>,
    pub auth_service: Arc<dyn AuthService>,
    pub api_service: Arc<dyn ApiService>,
    pub cached_item_store: Arc<CachedItemStore>,
    pub framework_service: Arc<dyn FrameworkService>,
    pub telemetry_service: Arc<dyn TelemetryService>,
}

pub struct ManagedProfileManager {
    deps: ManagedProfileDeps,
    user_api_path: String,
}

impl ManagedProfileManager {
    pub fn new(deps: ManagedProfileDeps, user_api_path: impl Into<String>) -> Self {
        Self {
            deps,
            user_api_path: user_api_path.into(),
        }
    }

    async fn require_session(&self) -> Result<OAuthSession, ApiError> {
        self.deps
            .auth_service
            .get_session()
            .await?
            .ok_or(ApiError::NoActiveSession)
    }

    /// Create a managed user on the server and a matching local profile.
    pub async fn add_managed_profile(
        &self,
        request: AddManagedProfileRequest,
    ) -> Result<Profile, ApiError> {
        self.require_session().await?;
        let active = self.deps.profile_service.get_active_session_profile().await?;

        let response = self
            .deps
            .api_service
            .fetch(
                Request::post(format!("{}/create", self.user_api_path))
                    .with_api_token(true)
                    .with_session_token(true)
                    .with_body(json!({
                        "request": {
                            "firstName": request.first_name,
                            "managedBy": request.managed_by,
                        }
                    })),
            )
            .await?;
        let user_id: String = response.result_field("userId")?;
        info!(user_id = %user_id, managed_by = %request.managed_by, "managed user created");

        let server_profile = self
            .deps
            .profile_service
            .get_server_profiles_details(ServerProfileDetailsRequest {
                user_id: user_id.clone(),
                required_fields: Vec::new(),
                from: CacheStrategy::Server,
            })
            .await?;

        if let Some(version) = server_profile.tnc_latest_version.clone() {
            self.deps
                .profile_service
                .accept_terms_and_conditions(AcceptTermsConditionRequest {
                    user_id: user_id.clone(),
                    version,
                })
                .await?;
        }

        self.deps
            .profile_service
            .create_profile(Profile {
                uid: user_id,
                handle: request.first_name,
                profile_type: active.profile_type,
                source: ProfileSource::Server,
                created_at: Some(now_millis()),
                server_profile: Some(server_profile),
            })
            .await
    }

    /// Server profiles managed by the active user.
    pub async fn get_managed_server_profiles(
        &self,
        request: GetManagedServerProfilesRequest,
    ) -> Result<Vec<ServerProfile>, ApiError> {
        self.require_session().await?;
        let active = self.deps.profile_service.get_active_session_profile().await?;

        let key = CacheKey {
            id: &active.uid,
            key_prefix: MANAGED_PROFILES_KEY,
            ttl_prefix: MANAGED_PROFILES_TTL_KEY,
        };
        self.deps
            .cached_item_store
            .get(
                key,
                request.from,
                self.search_managed_profiles(&active.uid, &request.required_fields)
                    .boxed(),
                None,
            )
            .await
    }

    async fn search_managed_profiles(
        &self,
        managed_by: &str,
        required_fields: &[String],
    ) -> Result<Vec<ServerProfile>, ApiError> {
        let response = self
            .deps
            .api_service
            .fetch(
                Request::post(format!("{}/search", self.user_api_path))
                    .with_api_token(true)
                    .with_session_token(true)
                    .with_body(json!({
                        "request": {
                            "filters": { "managedBy": managed_by },
                            "fields": required_fields,
                        }
                    })),
            )
            .await?;
        let content = response
            .body
            .pointer("/result/response/content")
            .cloned()
            .ok_or_else(|| {
                ApiError::InvalidResponse("response has no result.response.content".to_string())
            })?;
        serde_json::from_value(content)
            .map_err(|e| ApiError::InvalidResponse(format!("managed profiles: {}", e)))
    }

    /// Make a managed profile the active one, creating it locally on first use.
    pub async fn switch_session_to_managed_profile(
        &self,
        request: ManagedProfileSwitchRequest,
    ) -> Result<(), ApiError> {
        let previous = self.require_session().await?;

        match self.set_active_session_for_managed_profile(&request.uid).await {
            Ok(()) => {}
            Err(ApiError::NoProfileFound(_)) => {
                debug!(uid = %request.uid, "no local profile; creating from server profile");
                let server_profile = self
                    .deps
                    .profile_service
                    .get_server_profiles_details(ServerProfileDetailsRequest {
                        user_id: request.uid.clone(),
                        required_fields: Vec::new(),
                        from: CacheStrategy::Server,
                    })
                    .await?;
                self.deps
                    .profile_service
                    .create_profile(Profile {
                        uid: request.uid.clone(),
                        handle: server_profile
                            .first_name
                            .clone()
                            .unwrap_or_else(|| request.uid.clone()),
                        profile_type: ProfileType::Student,
                        source: ProfileSource::Server,
                        created_at: Some(now_millis()),
                        server_profile: Some(server_profile),
                    })
                    .await?;
                self.set_active_session_for_managed_profile(&request.uid)
                    .await?;
            }
            Err(err) => return Err(err),
        }

        let managed_by = previous.managed_by.clone().unwrap_or(previous.user_token.clone());
        self.deps
            .auth_service
            .set_session(OAuthSession {
                user_token: request.uid,
                managed_by: Some(managed_by),
                ..previous
            })
            .await
    }

    /// End the current profile session and start one for `uid`.
    pub(crate) async fn set_active_session_for_managed_profile(
        &self,
        uid: &str,
    ) -> Result<(), ApiError> {
        let current = self.deps.profile_service.get_active_profile_session().await?;
        let mut end = SessionTelemetry::session(current.uid.clone(), Some(current.sid.clone()));
        end.duration_ms = Some(now_millis().saturating_sub(current.created_time));
        self.deps.telemetry_service.end(end).await?;

        self.deps
            .profile_service
            .get_profile(uid)
            .await?
            .ok_or_else(|| ApiError::NoProfileFound(uid.to_string()))?;
        self.deps
            .profile_service
            .set_active_session_for_profile(uid)
            .await?;

        let server_profile = self
            .deps
            .profile_service
            .get_server_profiles_details(ServerProfileDetailsRequest {
                user_id: uid.to_string(),
                required_fields: Vec::new(),
                from: CacheStrategy::Cache,
            })
            .await?;
        if let Some(channel_id) = server_profile
            .root_org
            .as_ref()
            .and_then(|org| org.hash_tag_id.as_deref())
        {
            self.deps
                .framework_service
                .set_active_channel_id(channel_id)
                .await?;
        }

        let next = self.deps.profile_service.get_active_profile_session().await?;
        self.deps
            .telemetry_service
            .start(SessionTelemetry::session(next.uid, Some(next.sid)))
            .await?;
        Ok(())
    }
}
