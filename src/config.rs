//! Configuration management for Relay
//!
//! Configuration is loaded from environment variables (optionally seeded
//! from a `.env` file by the binary). The routing table lives in
//! `UPSTREAM_CONFIGS` as a JSON array; the `UPSTREAM_*` variables describe
//! the legacy single-backend fallback.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;

/// Default per-call upstream deadline (in milliseconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// One upstream backend target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamConfig {
    /// Model name a client sends to be routed here
    pub name_model: String,
    /// Full URL the chat request is POSTed to
    pub base_url: String,
    /// Bearer credential for the backend
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name the backend knows this target by
    #[serde(default)]
    pub request_model: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Model routing table, matched in order
    pub upstream_configs: Vec<UpstreamConfig>,

    /// Legacy single-backend URL
    pub upstream_base_url: Option<String>,
    /// Legacy single-backend API key
    pub upstream_api_key: Option<String>,
    /// Legacy request model override
    pub upstream_model_override: Option<String>,

    /// Deadline for each upstream call, from call start to response headers
    pub request_timeout_ms: u64,

    /// Enable debug endpoints (development only)
    pub debug_enabled: bool,
}

impl ProxyConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let upstream_configs = match non_empty_var("UPSTREAM_CONFIGS") {
            Some(raw) => parse_upstream_configs(&raw).context("Invalid UPSTREAM_CONFIGS")?,
            None => Vec::new(),
        };

        let request_timeout_ms: u64 = non_empty_var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| DEFAULT_REQUEST_TIMEOUT_MS.to_string())
            .parse()
            .context("Invalid REQUEST_TIMEOUT_MS")?;
        if request_timeout_ms == 0 {
            bail!("REQUEST_TIMEOUT_MS must be greater than zero");
        }

        Ok(Self {
            host: non_empty_var("RELAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: non_empty_var("RELAY_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("Invalid RELAY_PORT")?,

            upstream_configs,

            upstream_base_url: non_empty_var("UPSTREAM_BASE_URL"),
            upstream_api_key: non_empty_var("UPSTREAM_API_KEY"),
            upstream_model_override: non_empty_var("UPSTREAM_MODEL_OVERRIDE"),

            request_timeout_ms,

            debug_enabled: env::var("RELAY_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Whether the legacy single-backend fallback is configured
    pub fn has_legacy_upstream(&self) -> bool {
        self.upstream_base_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    /// Whether any request could be routed at all
    pub fn has_any_upstream(&self) -> bool {
        !self.upstream_configs.is_empty() || self.has_legacy_upstream()
    }
}

/// Read an environment variable, treating empty values as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse the JSON routing table
///
/// `requestModel` defaults to `nameModel`, and an empty `apiKey` is treated
/// as absent.
pub fn parse_upstream_configs(raw: &str) -> Result<Vec<UpstreamConfig>> {
    let mut configs: Vec<UpstreamConfig> =
        serde_json::from_str(raw).context("Expected a JSON array of upstream entries")?;

    for (index, entry) in configs.iter_mut().enumerate() {
        if entry.name_model.is_empty() {
            bail!("Upstream entry {} has an empty nameModel", index);
        }
        if entry.base_url.is_empty() {
            bail!(
                "Upstream entry {} ({}) has an empty baseUrl",
                index,
                entry.name_model
            );
        }
        if entry.request_model.is_empty() {
            entry.request_model = entry.name_model.clone();
        }
        if entry.api_key.as_deref().is_some_and(str::is_empty) {
            entry.api_key = None;
        }
    }

    Ok(configs)
}
