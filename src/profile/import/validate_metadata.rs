//! First import step: check that an exported store actually contains profiles.

use crate::error::ApiError;
use crate::profile::import::{
    ErrorCode, ImportProfileContext, ImportResponse, USER_PROFILE_IMPORT_TYPE,
};
use crate::store::{SdkStore, TREE_META_DATA};
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct ValidateProfileMetadata;

impl ValidateProfileMetadata {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        mut context: ImportProfileContext,
    ) -> Result<ImportResponse<ImportProfileContext>, ApiError> {
        let export = SdkStore::open_existing(&context.source_db_file_path)?;
        let entries: Vec<Map<String, Value>> = export.open_tree(TREE_META_DATA)?.values()?;

        let Some(metadata) = entries.into_iter().next() else {
            warn!(path = %context.source_db_file_path.display(), "export has no metadata");
            return Ok(ImportResponse::failed(ErrorCode::ImportFailed));
        };
        if !declares_profile_import(&metadata) {
            warn!(path = %context.source_db_file_path.display(), "export does not contain user profiles");
            return Ok(ImportResponse::failed(ErrorCode::ImportFailed));
        }

        debug!(path = %context.source_db_file_path.display(), "profile export metadata accepted");
        context.metadata = Some(metadata);
        Ok(ImportResponse::ok(context))
    }
}

fn declares_profile_import(metadata: &Map<String, Value>) -> bool {
    metadata
        .get("types")
        .and_then(Value::as_array)
        .is_some_and(|types| {
            types
                .iter()
                .any(|t| t.as_str() == Some(USER_PROFILE_IMPORT_TYPE))
        })
}
