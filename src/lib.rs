//! Relay - model-routed chat completion forwarder
//!
//! This library resolves the upstream backend for an OpenAI-compatible chat
//! completion request from its model name and forwards the request there,
//! handing the backend's response stream back to the client.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod upstream;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};

pub use crate::config::{ProxyConfig, UpstreamConfig};
pub use crate::error::{AppError, AppResult};
pub use crate::logging::{LogLevel, RequestLogger, TracingLogger};
pub use crate::upstream::{call_upstream, select_upstream_config, UpstreamResponse};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: ProxyConfig,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
    /// Sink for per-request upstream log entries
    pub logger: Arc<dyn RequestLogger>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: ProxyConfig) -> Result<Self> {
        // No client-level timeouts; the invoker's per-call deadline is the only timer.
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .build()?;

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            started_at: Utc::now(),
            logger: Arc::new(TracingLogger),
        })
    }

    /// Create an application state with a caller-provided logger
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(config: ProxyConfig, logger: Arc<dyn RequestLogger>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            start_time: Instant::now(),
            started_at: Utc::now(),
            logger,
        }
    }
}
