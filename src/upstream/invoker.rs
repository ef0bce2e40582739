//! Upstream invocation
//!
//! Performs the single outbound POST for a resolved target under a
//! call-scoped deadline and hands back the unconsumed response.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use serde_json::json;
use tokio::time::{timeout_at, Instant};

use crate::{
    config::UpstreamConfig,
    error::{AppError, AppResult},
    logging::{LogLevel, RequestLogger},
    upstream::headers::build_upstream_headers,
};

/// Stream type for upstream response bodies
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Response received from an upstream backend
///
/// Any status is a valid response here, including 4xx/5xx; the body has not
/// been read yet.
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Forward a chat request to the resolved upstream
///
/// The deadline runs from the start of this call until response headers
/// arrive. It is owned by the `timeout_at` future and released on every exit
/// path, so it never touches the body stream handed back to the caller.
/// The body is forwarded verbatim; `request_model` is only reported in logs.
pub async fn call_upstream<T>(
    client: &reqwest::Client,
    body: &T,
    upstream: &UpstreamConfig,
    request_timeout_ms: u64,
    request_id: &str,
    logger: &dyn RequestLogger,
) -> AppResult<UpstreamResponse>
where
    T: Serialize + ?Sized,
{
    let deadline = Instant::now() + Duration::from_millis(request_timeout_ms);

    let headers = build_upstream_headers(upstream.api_key.as_deref())?;
    let payload = serde_json::to_value(body).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Failed to serialize upstream request: {}", e))
    })?;

    logger
        .log(
            request_id,
            LogLevel::Debug,
            "Sending upstream request",
            json!({
                "url": upstream.base_url,
                "requestModel": upstream.request_model,
                "upstreamRequestBody": &payload,
            }),
        )
        .await;

    let send = client
        .post(&upstream.base_url)
        .headers(headers)
        .json(&payload)
        .send();

    let response = match timeout_at(deadline, send).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            let err = AppError::UpstreamUnavailable(e.to_string());
            log_failure(logger, request_id, upstream, &err).await;
            return Err(err);
        }
        Err(_) => {
            let err = AppError::UpstreamTimeout {
                timeout_ms: request_timeout_ms,
            };
            log_failure(logger, request_id, upstream, &err).await;
            return Err(err);
        }
    };

    let status = response.status();
    logger
        .log(
            request_id,
            LogLevel::Debug,
            "Upstream response received",
            json!({ "status": status.as_u16() }),
        )
        .await;

    if !has_body(&response) {
        return Err(AppError::InvalidUpstreamResponse(format!(
            "Upstream response has no body (status {})",
            status.as_u16()
        )));
    }

    let headers = response.headers().clone();
    Ok(UpstreamResponse {
        status,
        headers,
        body: Box::pin(response.bytes_stream()),
    })
}

/// Whether a response carries a body worth streaming
///
/// Null-body statuses and an exact length of zero count as no body.
fn has_body(response: &reqwest::Response) -> bool {
    let status = response.status();
    if status == StatusCode::NO_CONTENT
        || status == StatusCode::RESET_CONTENT
        || status == StatusCode::NOT_MODIFIED
    {
        return false;
    }
    response.content_length() != Some(0)
}

async fn log_failure(
    logger: &dyn RequestLogger,
    request_id: &str,
    upstream: &UpstreamConfig,
    err: &AppError,
) {
    logger
        .log(
            request_id,
            LogLevel::Error,
            "Upstream request failed",
            json!({
                "url": upstream.base_url,
                "kind": err.kind(),
                "error": err.to_string(),
            }),
        )
        .await;
}
