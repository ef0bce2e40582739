//! Common test utilities for Relay
//!
//! Shared fixtures, mock upstream backends and the test harness used by the
//! integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use relay::{routes, AppState, LogLevel, ProxyConfig, RequestLogger, UpstreamConfig};

/// Test configuration constants
pub mod constants {
    /// Upstream path the mock backends serve
    pub const CHAT_PATH: &str = "/v1/chat/completions";
    /// API key of the primary mock upstream
    pub const TEST_UPSTREAM_API_KEY: &str = "test-upstream-api-key";
    /// API key of the legacy mock upstream
    pub const TEST_LEGACY_API_KEY: &str = "test-legacy-api-key";
}

/// A captured request log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub request_id: String,
    pub level: LogLevel,
    pub message: String,
    pub metadata: Value,
}

/// Logger that keeps every entry for later inspection
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestLogger for RecordingLogger {
    async fn log(&self, request_id: &str, level: LogLevel, message: &str, metadata: Value) {
        self.entries.lock().unwrap().push(LogEntry {
            request_id: request_id.to_string(),
            level,
            message: message.to_string(),
            metadata,
        });
    }
}

/// Build a routing table entry
pub fn upstream(name_model: &str, base_url: String, request_model: &str, api_key: Option<&str>) -> UpstreamConfig {
    UpstreamConfig {
        name_model: name_model.to_string(),
        base_url,
        api_key: api_key.map(str::to_string),
        request_model: request_model.to_string(),
    }
}

/// Build a config with the given routing table and no legacy fallback
pub fn test_config(upstreams: Vec<UpstreamConfig>) -> ProxyConfig {
    ProxyConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream_configs: upstreams,
        upstream_base_url: None,
        upstream_api_key: None,
        upstream_model_override: None,
        request_timeout_ms: 2_000,
        debug_enabled: false,
    }
}

/// Mock upstream backend responses
pub mod upstream_mocks {
    use super::*;
    use serde_json::json;

    /// Non-streaming chat completion body
    pub fn chat_completion_body(model: &str) -> Value {
        json!({
            "id": "chatcmpl-test123",
            "object": "chat.completion",
            "created": 1706745600,
            "model": model,
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "Hello! How can I help you today?"
                    },
                    "finish_reason": "stop"
                }
            ],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 8,
                "total_tokens": 18
            }
        })
    }

    /// SSE stream body
    pub const STREAM_DATA: &str = concat!(
        "data: {\"id\":\"chatcmpl-test123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-test123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-test123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n"
    );

    /// Mock a successful non-streaming completion
    pub async fn mock_chat_completion(server: &MockServer, model: &str) {
        Mock::given(method("POST"))
            .and(path(constants::CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(model)))
            .mount(server)
            .await;
    }

    /// Mock a streaming completion
    pub async fn mock_chat_completion_streaming(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(constants::CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(STREAM_DATA, "text/event-stream")
                    .insert_header("cache-control", "no-cache"),
            )
            .mount(server)
            .await;
    }

    /// Mock a backend error with a JSON body
    pub async fn mock_chat_completion_error(server: &MockServer, status: u16) {
        Mock::given(method("POST"))
            .and(path(constants::CHAT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "message": "The server had an error while processing your request",
                    "type": "server_error"
                }
            })))
            .mount(server)
            .await;
    }

    /// Mock a backend that answers only after `delay`
    pub async fn mock_chat_completion_delayed(server: &MockServer, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(constants::CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_completion_body("slow"))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }

    /// Mock a backend that answers 200 without a body
    pub async fn mock_chat_completion_empty(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(constants::CHAT_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }
}

/// Sample request data for tests
pub mod test_data {
    use serde_json::{json, Value};

    /// Valid chat completion request
    pub fn chat_request(model: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                {
                    "role": "user",
                    "content": "Hello, how are you?"
                }
            ],
            "temperature": 0.7
        })
    }

    /// Chat completion request with streaming
    pub fn streaming_chat_request(model: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                {
                    "role": "user",
                    "content": "Hello!"
                }
            ],
            "stream": true
        })
    }
}

/// Test harness with a real router in front of a mock upstream
pub struct TestHarness {
    pub server: TestServer,
    pub upstream: MockServer,
    pub logger: Arc<RecordingLogger>,
}

impl TestHarness {
    /// Start a mock upstream and route `gpt-4` (aliased to `gpt-4-turbo`) to it
    pub async fn new() -> Self {
        Self::with_config(|uri| {
            test_config(vec![upstream(
                "gpt-4",
                format!("{}{}", uri, constants::CHAT_PATH),
                "gpt-4-turbo",
                Some(constants::TEST_UPSTREAM_API_KEY),
            )])
        })
        .await
    }

    /// Start a mock upstream and build the config from its URI
    pub async fn with_config(build: impl FnOnce(&str) -> ProxyConfig) -> Self {
        let upstream = MockServer::start().await;
        let config = build(&upstream.uri());

        let logger = Arc::new(RecordingLogger::default());
        let state = Arc::new(AppState::new_for_testing(config, logger.clone()));
        let app = routes::create_router(state);
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            upstream,
            logger,
        }
    }

    /// Requests the mock upstream has received so far
    pub async fn upstream_requests(&self) -> Vec<wiremock::Request> {
        self.upstream.received_requests().await.unwrap_or_default()
    }
}
