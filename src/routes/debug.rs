//! Debug endpoints for development
//!
//! Only available when RELAY_DEBUG=true. API keys are never exposed.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::{config::UpstreamConfig, AppState};

/// Routing table entry with the credential redacted
#[derive(Debug, Serialize)]
pub struct UpstreamInfo {
    pub name_model: String,
    pub base_url: String,
    pub request_model: String,
    pub has_api_key: bool,
}

impl From<&UpstreamConfig> for UpstreamInfo {
    fn from(upstream: &UpstreamConfig) -> Self {
        Self {
            name_model: upstream.name_model.clone(),
            base_url: upstream.base_url.clone(),
            request_model: upstream.request_model.clone(),
            has_api_key: upstream.api_key.is_some(),
        }
    }
}

/// Legacy fallback settings, redacted
#[derive(Debug, Serialize)]
pub struct LegacyInfo {
    pub base_url: String,
    pub model_override: Option<String>,
    pub has_api_key: bool,
}

/// Config response (non-sensitive)
#[derive(Debug, Serialize)]
pub struct ConfigInfo {
    pub upstreams: Vec<UpstreamInfo>,
    pub legacy: Option<LegacyInfo>,
    pub request_timeout_ms: u64,
    pub debug_enabled: bool,
}

/// GET /debug/config - Return the routing table without credentials
pub async fn config_info(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let config = &state.config;
    if !config.debug_enabled {
        return Err(debug_disabled_error());
    }

    let legacy = config
        .upstream_base_url
        .as_ref()
        .filter(|_| config.has_legacy_upstream())
        .map(|base_url| LegacyInfo {
            base_url: base_url.clone(),
            model_override: config.upstream_model_override.clone(),
            has_api_key: config.upstream_api_key.is_some(),
        });

    let response = ConfigInfo {
        upstreams: config.upstream_configs.iter().map(UpstreamInfo::from).collect(),
        legacy,
        request_timeout_ms: config.request_timeout_ms,
        debug_enabled: config.debug_enabled,
    };

    Ok(Json(response))
}

/// Helper to return a consistent 404 error when debug is disabled
fn debug_disabled_error() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": {
                "message": "Debug endpoints are disabled. Set RELAY_DEBUG=true to enable.",
                "code": "DEBUG_DISABLED"
            }
        })),
    )
}
