//! CLI route: single route table and run context. Dispatches to SDK services and presentation.

use crate::api::{ApiRequestHandler, ApiService, HttpApiService};
use crate::config::{ConfigLoader, SdkConfig};
use crate::content::HttpContentService;
use crate::course::{CourseContext, CourseServiceImpl};
use crate::error::{ApiError, StorageError};
use crate::events_bus::{BusEvent, EventsBus};
use crate::file::FsAssetReader;
use crate::framework::{ChannelDetailsRequest, GetChannelDetailsHandler};
use crate::key_value_store::{CacheStrategy, CachedItemStore, SledKeyValueStore};
use crate::preferences::{ContentKeys, SharedPreferences, SledSharedPreferences};
use crate::profile::import::{ImportProfileContext, ValidateProfileMetadata};
use crate::profile::SledContentAccessStore;
use crate::store::SdkStore;
use crate::summarizer::{HandlerDeps, SledSummarizerStore, SummaryTelemetryEventHandler};
use crate::telemetry::Telemetry;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::cli::command_name;
use crate::cli::parse::{Commands, ConfigCommands, ContextCommands};
use crate::cli::presentation::{
    format_channel_json, format_channel_text, format_context_json, format_context_text,
    format_import_validation, format_ingest_summary, IngestSummary,
};

/// Runtime context for CLI execution: workspace, effective config and SDK services.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    config: SdkConfig,
    workspace_root: PathBuf,
    store: SdkStore,
    api: Arc<dyn ApiService>,
    preferences: Arc<dyn SharedPreferences>,
    runtime: Runtime,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        let store_path = config.storage.resolve_store_path(&workspace_root);
        std::fs::create_dir_all(&store_path).map_err(StorageError::IoError)?;
        let store = SdkStore::open(&store_path)?;
        debug!(path = %store_path.display(), "store opened");

        let api: Arc<dyn ApiService> = Arc::new(HttpApiService::new(&config.api)?);
        let preferences: Arc<dyn SharedPreferences> =
            Arc::new(SledSharedPreferences::new(&store)?);
        let runtime = Runtime::new().map_err(StorageError::IoError)?;

        Ok(Self {
            config,
            workspace_root,
            store,
            api,
            preferences,
            runtime,
        })
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        debug!(command = %name, "executing command");
        let result = self.execute_inner(command);
        if let Err(ref e) = result {
            warn!(command = %name, error = %e, "command failed");
        }
        if let Err(e) = self.store.flush() {
            warn!(error = %e, "failed to flush store");
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Channel {
                channel_id,
                from,
                format,
            } => self.handle_channel(channel_id, from, format),
            Commands::Ingest { path, format } => self.handle_ingest(path, format),
            Commands::Context { command } => self.handle_context_command(command),
            Commands::ValidateExport { path } => {
                let response = ValidateProfileMetadata::new()
                    .execute(ImportProfileContext::new(path.clone()))?;
                Ok(format_import_validation(&response))
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => self.handle_config_show(),
            },
        }
    }

    fn handle_channel(
        &self,
        channel_id: &str,
        from: &str,
        format: &str,
    ) -> Result<String, ApiError> {
        let from = parse_strategy(from)?;
        let kv = Arc::new(SledKeyValueStore::new(&self.store)?);
        let cache = Arc::new(CachedItemStore::new(kv, self.config.cache.ttl()));
        let assets = Arc::new(FsAssetReader::new(
            self.workspace_root.join(&self.config.framework.assets_path),
        ));
        let handler = GetChannelDetailsHandler::new(
            self.api.clone(),
            self.config.framework.clone(),
            assets,
            cache,
        );

        let channel = self.runtime.block_on(handler.handle(ChannelDetailsRequest {
            channel_id: channel_id.to_string(),
            from,
        }))?;
        Ok(match format {
            "json" => format_channel_json(&channel),
            _ => format_channel_text(&channel),
        })
    }

    fn summary_handler(
        &self,
    ) -> Result<(SummaryTelemetryEventHandler, Receiver<BusEvent>), ApiError> {
        let (bus, bus_events) = EventsBus::new_pair();
        let deps = HandlerDeps {
            course_service: Arc::new(CourseServiceImpl::new(
                self.api.clone(),
                self.config.course.course_api_path.clone(),
            )),
            preferences: self.preferences.clone(),
            summarizer: Arc::new(SledSummarizerStore::new(&self.store)?),
            events_bus: Arc::new(bus),
            content_service: Arc::new(HttpContentService::new(
                self.api.clone(),
                self.config.course.content_api_path.clone(),
                &self.store,
            )?),
            content_access: Arc::new(SledContentAccessStore::new(&self.store)?),
        };
        Ok((
            SummaryTelemetryEventHandler::new(deps, &self.config.summarizer),
            bus_events,
        ))
    }

    fn handle_ingest(&self, path: &Path, format: &str) -> Result<String, ApiError> {
        let contents = std::fs::read_to_string(path).map_err(StorageError::IoError)?;
        let (handler, bus_events) = self.summary_handler()?;

        let mut summary = IngestSummary::default();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event: Telemetry = match serde_json::from_str(line) {
                Ok(event) => event,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "skipping unparseable telemetry line");
                    summary.skipped_lines += 1;
                    continue;
                }
            };
            match self.runtime.block_on(handler.handle(event)) {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "telemetry event failed");
                    summary.failed += 1;
                }
            }
        }
        summary.bus_events = bus_events.try_iter().collect();
        info!(
            processed = summary.processed,
            failed = summary.failed,
            bus_events = summary.bus_events.len(),
            "ingest finished"
        );
        Ok(format_ingest_summary(&summary, format))
    }

    fn handle_context_command(&self, command: &ContextCommands) -> Result<String, ApiError> {
        match command {
            ContextCommands::Show { format } => {
                let raw = self
                    .runtime
                    .block_on(self.preferences.get_string(ContentKeys::COURSE_CONTEXT))?;
                let context = CourseContext::from_preference(raw.as_deref())?;
                Ok(match format.as_str() {
                    "json" => format_context_json(&context),
                    _ => format_context_text(&context),
                })
            }
            ContextCommands::Clear => {
                self.runtime
                    .block_on(self.preferences.put_string(ContentKeys::COURSE_CONTEXT, ""))?;
                Ok("Course context cleared.".to_string())
            }
        }
    }

    fn handle_config_show(&self) -> Result<String, ApiError> {
        let mut shown = self.config.clone();
        if shown.api.api_token.is_some() {
            shown.api.api_token = Some("********".to_string());
        }
        if shown.api.user_token.is_some() {
            shown.api.user_token = Some("********".to_string());
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

fn parse_strategy(value: &str) -> Result<CacheStrategy, ApiError> {
    match value.to_ascii_lowercase().as_str() {
        "server" => Ok(CacheStrategy::Server),
        "cache" => Ok(CacheStrategy::Cache),
        other => Err(ApiError::ConfigError(format!(
            "Unknown lookup strategy '{}': expected server or cache",
            other
        ))),
    }
}
