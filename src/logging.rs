//! Request logging for upstream forwarding
//!
//! The invoker reports through the [`RequestLogger`] port so request
//! handling stays testable: production wires in [`TracingLogger`], tests
//! substitute a recording or no-op implementation.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Severity of a request log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Sink for per-request log entries
///
/// Implementations must not fail: a broken sink never aborts a request.
#[async_trait]
pub trait RequestLogger: Send + Sync {
    async fn log(&self, request_id: &str, level: LogLevel, message: &str, metadata: Value);
}

/// Logger backed by `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

#[async_trait]
impl RequestLogger for TracingLogger {
    async fn log(&self, request_id: &str, level: LogLevel, message: &str, metadata: Value) {
        match level {
            LogLevel::Debug => debug!(request_id = %request_id, metadata = %metadata, "{}", message),
            LogLevel::Info => info!(request_id = %request_id, metadata = %metadata, "{}", message),
            LogLevel::Warn => warn!(request_id = %request_id, metadata = %metadata, "{}", message),
            LogLevel::Error => error!(request_id = %request_id, metadata = %metadata, "{}", message),
        }
    }
}

/// Logger that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

#[async_trait]
impl RequestLogger for NoopLogger {
    async fn log(&self, _request_id: &str, _level: LogLevel, _message: &str, _metadata: Value) {}
}

/// Generate a correlation id for an inbound request
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}
