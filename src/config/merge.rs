//! Merge rules: defaults first, later sources override earlier ones.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the SDK defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("storage.store_path", ".coursekit/store")?
        .set_default("summarizer.end_event_validation_delay_ms", 2000)?
        .set_default("cache.ttl_ms", 3_600_000)
}
