//! Models endpoint
//!
//! Lists the model names clients can route through the proxy.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, upstream::select_upstream_config, AppState};

/// Model information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

/// Models list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<Model>,
}

fn model_entry(id: &str, created: i64) -> Model {
    Model {
        id: id.to_string(),
        object: "model".to_string(),
        created,
        owned_by: "relay".to_string(),
    }
}

/// List available models
///
/// Returns the routing table's model names in configuration order. Shadowed
/// duplicates are listed once. Models reachable only through the legacy
/// fallback are not enumerable and do not appear.
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> AppResult<(StatusCode, Json<ModelsResponse>)> {
    let created = state.started_at.timestamp();
    let mut seen = HashSet::new();

    let models = state
        .config
        .upstream_configs
        .iter()
        .filter(|u| seen.insert(u.name_model.as_str()))
        .map(|u| model_entry(&u.name_model, created))
        .collect();

    let response = ModelsResponse {
        object: "list".to_string(),
        data: models,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Get a specific model by ID
///
/// Succeeds for any model name a chat request could be routed with.
pub async fn get_model(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
) -> AppResult<(StatusCode, Json<Model>)> {
    let upstream = select_upstream_config(&state.config, &model_id)?;
    Ok((
        StatusCode::OK,
        Json(model_entry(&upstream.name_model, state.started_at.timestamp())),
    ))
}
