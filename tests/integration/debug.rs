//! Debug endpoint integration tests
//!
//! GET /debug/config is gated by `debug_enabled` and must never leak keys.

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::{constants, test_config, upstream, TestHarness};

async fn harness(debug_enabled: bool) -> TestHarness {
    TestHarness::with_config(|uri| {
        let mut config = test_config(vec![upstream(
            "gpt-4",
            format!("{}/v1/chat/completions", uri),
            "gpt-4-turbo",
            Some(constants::TEST_UPSTREAM_API_KEY),
        )]);
        config.upstream_base_url = Some(format!("{}/legacy", uri));
        config.upstream_api_key = Some(constants::TEST_LEGACY_API_KEY.to_string());
        config.debug_enabled = debug_enabled;
        config
    })
    .await
}

#[tokio::test]
async fn test_debug_config_disabled_by_default() {
    let harness = harness(false).await;

    let response = harness.server.get("/debug/config").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "DEBUG_DISABLED");
}

#[tokio::test]
async fn test_debug_config_redacts_api_keys() {
    let harness = harness(true).await;

    let response = harness.server.get("/debug/config").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let text = response.text();
    assert!(!text.contains(constants::TEST_UPSTREAM_API_KEY));
    assert!(!text.contains(constants::TEST_LEGACY_API_KEY));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["upstreams"][0]["name_model"], "gpt-4");
    assert_eq!(body["upstreams"][0]["request_model"], "gpt-4-turbo");
    assert_eq!(body["upstreams"][0]["has_api_key"], true);
    assert_eq!(body["legacy"]["has_api_key"], true);
    assert_eq!(body["request_timeout_ms"], 2000);
}
