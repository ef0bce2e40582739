//! Chat completions endpoint
//!
//! OpenAI-compatible chat completions API endpoint. The upstream is picked
//! from the request's model name and its response (status, headers and
//! body stream) is relayed back as-is, whether streaming or not.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{error::Category, Map, Value};
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    logging::new_request_id,
    routes::metrics::{record_request, record_upstream_error},
    upstream::{call_upstream, headers::filter_response_headers, select_upstream_config},
    AppState,
};

/// Response header carrying the request correlation id
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Chat completion request
///
/// Only the fields needed for routing are typed; everything else is kept in
/// `extra` and serialized back untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Handle chat completion requests
pub async fn chat_completions(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request_id = new_request_id();

    let mut response = match forward_chat(&state, &request_id, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn forward_chat(state: &AppState, request_id: &str, body: &[u8]) -> AppResult<Response> {
    let start_time = Instant::now();

    let chat_request: ChatCompletionRequest =
        serde_json::from_slice(body).map_err(|e| match e.classify() {
            Category::Data => AppError::BadRequest(format!("Invalid request body: {}", e)),
            _ => AppError::JsonError(e),
        })?;

    let model = chat_request.model.clone();

    info!(
        request_id = %request_id,
        model = %model,
        stream = %chat_request.stream.unwrap_or(false),
        messages = %chat_request.messages.len(),
        "Processing chat completion request"
    );

    let upstream = select_upstream_config(&state.config, &model).map_err(|e| {
        warn!(request_id = %request_id, model = %model, "No upstream for model");
        record_request("not_found", &model, start_time.elapsed().as_secs_f64());
        e
    })?;

    let result = call_upstream(
        &state.http_client,
        &chat_request,
        &upstream,
        state.config.request_timeout_ms,
        request_id,
        state.logger.as_ref(),
    )
    .await;

    let duration = start_time.elapsed().as_secs_f64();
    let upstream_response = match result {
        Ok(response) => response,
        Err(e) => {
            warn!(
                request_id = %request_id,
                model = %model,
                url = %upstream.base_url,
                error = %e,
                "Upstream call failed"
            );
            if e.is_upstream_failure() {
                record_upstream_error(e.kind());
                record_request("upstream_error", &model, duration);
            } else {
                record_request("error", &model, duration);
            }
            return Err(e);
        }
    };

    let status = upstream_response.status;
    record_request(status.as_str(), &model, duration);
    info!(
        request_id = %request_id,
        model = %model,
        status = %status.as_u16(),
        duration_ms = %format!("{:.2}", duration * 1000.0),
        "Relaying upstream response"
    );

    let stream_request_id = request_id.to_string();
    let tracked_stream = upstream_response.body.map(move |chunk| {
        if let Err(ref e) = chunk {
            warn!(request_id = %stream_request_id, error = %e, "Upstream stream error");
        }
        chunk
    });

    let mut response = Response::new(Body::from_stream(tracked_stream));
    *response.status_mut() = status;
    *response.headers_mut() = filter_response_headers(&upstream_response.headers);

    Ok(response)
}
