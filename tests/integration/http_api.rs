//! HttpApiService against a local one-shot server

use super::test_utils::serve_once;
use coursekit::api::{ApiService, HttpApiService, Request};
use coursekit::config::ApiConfig;
use coursekit::error::ApiError;
use serde_json::json;

fn config(base_url: String) -> ApiConfig {
    ApiConfig {
        base_url,
        api_token: Some("api-tok".to_string()),
        user_token: Some("user-tok".to_string()),
        ..ApiConfig::default()
    }
}

#[tokio::test]
async fn get_sends_bearer_token_and_parses_json() {
    let (base_url, server) =
        serve_once(200, r#"{"result":{"channel":{"identifier":"c1"}}}"#).await;
    let service = HttpApiService::new(&config(base_url)).unwrap();

    let response = service
        .fetch(Request::get("/api/channel/v1/read/c1").with_api_token(true))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body["result"]["channel"]["identifier"], "c1");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /api/channel/v1/read/c1 "));
    let lower = raw.to_lowercase();
    assert!(lower.contains("authorization: bearer api-tok"));
    assert!(!lower.contains("x-authenticated-user-token"));
}

#[tokio::test]
async fn patch_sends_session_token_and_body() {
    let (base_url, server) = serve_once(200, r#"{"result":{}}"#).await;
    let service = HttpApiService::new(&config(base_url)).unwrap();

    service
        .fetch(
            Request::patch("/api/course/v1/user/content/state/update")
                .with_session_token(true)
                .with_body(json!({ "request": { "userId": "u1" } })),
        )
        .await
        .unwrap();

    let raw = server.await.unwrap();
    assert!(raw.starts_with("PATCH /api/course/v1/user/content/state/update "));
    assert!(raw.to_lowercase().contains("x-authenticated-user-token: user-tok"));
    assert!(raw.contains(r#"{"request":{"userId":"u1"}}"#));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let (base_url, server) = serve_once(404, r#"{"params":{"err":"NOT_FOUND"}}"#).await;
    let service = HttpApiService::new(&config(base_url)).unwrap();

    let err = service
        .fetch(Request::get("/api/channel/v1/read/missing"))
        .await
        .unwrap_err();
    match err {
        ApiError::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("NOT_FOUND"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn missing_user_token_means_no_session() {
    let service = HttpApiService::new(&ApiConfig::default()).unwrap();
    let err = service
        .fetch(Request::post("/api/user/v1/search").with_session_token(true))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NoActiveSession));
}
