//! Model-name based upstream resolution
//!
//! Picks the backend for a client model name: the first matching entry of
//! the routing table wins, then the legacy single-backend settings, then
//! the request is rejected.

use tracing::debug;

use crate::{
    config::{ProxyConfig, UpstreamConfig},
    error::{AppError, AppResult},
};

/// Select the upstream configuration for a client model name
///
/// Matching is exact and case-sensitive. When nothing in
/// `upstream_configs` matches but a legacy base URL is set, a target is
/// synthesized from the legacy fields; `request_model` then falls back to
/// the client model when no override is configured.
pub fn select_upstream_config(config: &ProxyConfig, client_model: &str) -> AppResult<UpstreamConfig> {
    if let Some(upstream) = config
        .upstream_configs
        .iter()
        .find(|u| u.name_model == client_model)
    {
        debug!(model = %client_model, base_url = %upstream.base_url, "Matched upstream entry");
        return Ok(upstream.clone());
    }

    if let Some(base_url) = config.upstream_base_url.as_deref().filter(|u| !u.is_empty()) {
        debug!(model = %client_model, base_url = %base_url, "Using legacy upstream");
        return Ok(UpstreamConfig {
            name_model: client_model.to_string(),
            base_url: base_url.to_string(),
            api_key: config.upstream_api_key.clone(),
            request_model: config
                .upstream_model_override
                .clone()
                .unwrap_or_else(|| client_model.to_string()),
        });
    }

    Err(AppError::ModelNotFound(client_model.to_string()))
}
