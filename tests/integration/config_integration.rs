//! Integration tests for layered configuration loading

use super::test_utils::with_env;
use coursekit::config::{global_config_path, workspace_config_path, ConfigLoader};
use coursekit::error::ApiError;
use tempfile::TempDir;

#[test]
fn workspace_file_overrides_global_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_env(&test_dir, &[], || {
        let global = global_config_path().unwrap();
        std::fs::create_dir_all(global.parent().unwrap()).unwrap();
        std::fs::write(
            &global,
            r#"
[api]
base_url = "https://global.example.org"

[cache]
ttl_ms = 1000
"#,
        )
        .unwrap();

        let local = workspace_config_path(workspace.path());
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(
            &local,
            r#"
[api]
base_url = "https://workspace.example.org"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.api.base_url, "https://workspace.example.org");
        assert_eq!(config.cache.ttl_ms, 1000);
        assert_eq!(config.course.user_api_path, "/api/user/v1");
    });
}

#[test]
fn environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_env(
        &test_dir,
        &[
            ("COURSEKIT__SUMMARIZER__END_EVENT_VALIDATION_DELAY_MS", "0"),
            ("COURSEKIT__API__API_TOKEN", "from-env"),
        ],
        || {
            let config = ConfigLoader::load(workspace.path()).unwrap();
            assert_eq!(config.summarizer.end_event_validation_delay_ms, 0);
            assert_eq!(config.api.api_token.as_deref(), Some("from-env"));
        },
    );
}

#[test]
fn invalid_layered_config_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_env(&test_dir, &[("COURSEKIT__API__BASE_URL", "ftp://nope")], || {
        let err = ConfigLoader::load(workspace.path()).unwrap_err();
        match err {
            ApiError::ConfigError(msg) => assert!(msg.contains("base_url")),
            other => panic!("unexpected error: {other:?}"),
        }
    });
}
