//! Configuration System
//!
//! Layered SDK configuration: built-in defaults, the global config file, the workspace
//! config file and `COURSEKIT__*` environment variables, in that override order.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::workspace_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdkConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub framework: FrameworkServiceConfig,

    #[serde(default)]
    pub course: CourseServiceConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub summarizer: SummarizerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token attached to requests built with `with_api_token(true)`
    #[serde(default)]
    pub api_token: Option<String>,

    /// User access token attached to requests built with `with_session_token(true)`
    #[serde(default)]
    pub user_token: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://staging.example.org".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            user_token: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Channel/framework lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkServiceConfig {
    #[serde(default = "default_channel_api_path")]
    pub channel_api_path: String,

    /// Directory of bundled `channel-<id>.json` files, relative to `assets_path`
    #[serde(default = "default_channel_config_dir_path")]
    pub channel_config_dir_path: String,

    #[serde(default = "default_assets_path")]
    pub assets_path: PathBuf,
}

fn default_channel_api_path() -> String {
    "/api/channel/v1".to_string()
}

fn default_channel_config_dir_path() -> String {
    "/data/channel".to_string()
}

fn default_assets_path() -> PathBuf {
    PathBuf::from("assets")
}

impl Default for FrameworkServiceConfig {
    fn default() -> Self {
        Self {
            channel_api_path: default_channel_api_path(),
            channel_config_dir_path: default_channel_config_dir_path(),
            assets_path: default_assets_path(),
        }
    }
}

/// Course, content and user endpoint prefixes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseServiceConfig {
    #[serde(default = "default_course_api_path")]
    pub course_api_path: String,

    #[serde(default = "default_content_api_path")]
    pub content_api_path: String,

    #[serde(default = "default_user_api_path")]
    pub user_api_path: String,
}

fn default_course_api_path() -> String {
    "/api/course/v1".to_string()
}

fn default_content_api_path() -> String {
    "/api/content/v1".to_string()
}

fn default_user_api_path() -> String {
    "/api/user/v1".to_string()
}

impl Default for CourseServiceConfig {
    fn default() -> Self {
        Self {
            course_api_path: default_course_api_path(),
            content_api_path: default_content_api_path(),
            user_api_path: default_user_api_path(),
        }
    }
}

/// Read-through cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a server-fetched item stays fresh
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

fn default_ttl_ms() -> u64 {
    3_600_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Summary telemetry handler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Wait applied after fetching content details and before judging an END event
    #[serde(default = "default_end_event_validation_delay_ms")]
    pub end_event_validation_delay_ms: u64,
}

fn default_end_event_validation_delay_ms() -> u64 {
    2000
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            end_event_validation_delay_ms: default_end_event_validation_delay_ms(),
        }
    }
}

impl SummarizerConfig {
    pub fn end_event_validation_delay(&self) -> Duration {
        Duration::from_millis(self.end_event_validation_delay_ms)
    }
}

/// Local storage paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".coursekit/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    /// Store path resolved against the workspace root when relative.
    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Api(String),
    Cache(String),
    Storage(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Api(msg) => write!(f, "api: {}", msg),
            ValidationError::Cache(msg) => write!(f, "cache: {}", msg),
            ValidationError::Storage(msg) => write!(f, "storage: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SdkConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            errors.push(ValidationError::Api("base_url cannot be empty".to_string()));
        } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            errors.push(ValidationError::Api(format!(
                "base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        if self.cache.ttl_ms == 0 {
            errors.push(ValidationError::Cache("ttl_ms must be positive".to_string()));
        }

        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "store_path cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads `SdkConfig` from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace: defaults, global file, workspace file, env.
    pub fn load(workspace_root: &Path) -> Result<SdkConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::env::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Load configuration from an explicit file plus env overrides.
    pub fn load_from_file(path: &Path) -> Result<SdkConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::builder_with_defaults()?
            .add_source(config::File::from(path).required(true));
        let builder = sources::env::add_to_builder(builder);
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<SdkConfig, ApiError> {
        let config: SdkConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
