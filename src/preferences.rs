//! Preference store
//!
//! Scoped string get/put keyed by name. The SDK keeps the current course context and
//! the last-read content per course batch here.

use crate::error::ApiError;
use async_trait::async_trait;

pub mod memory;
pub mod sled_store;

pub use memory::MemorySharedPreferences;
pub use sled_store::SledSharedPreferences;

/// Well-known preference keys for content/course state.
pub struct ContentKeys;

impl ContentKeys {
    /// Serialized `CourseContext` JSON; empty or absent means no active course.
    pub const COURSE_CONTEXT: &'static str = "content.course_context";
}

#[async_trait]
pub trait SharedPreferences: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>, ApiError>;
    async fn put_string(&self, key: &str, value: &str) -> Result<(), ApiError>;
}
