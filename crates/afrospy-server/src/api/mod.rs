mod stream;
mod trigger;

use afrospy_core::{DisconnectPolicy, TriggerPolicy};
use afrospy_ingest::{IngestParams, Ingestor};
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub ingestor: Ingestor,
    pub policy: TriggerPolicy,
    pub on_disconnect: DisconnectPolicy,
}

/// Error payload of every endpoint: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// Body shared by both trigger endpoints. Everything but `keyword` is
/// optional; `limit` may arrive as a number or a numeric string.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TriggerRequest {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    limit: Option<Value>,
    #[serde(default)]
    platform: Option<String>,
}

impl TriggerRequest {
    /// Applies the country allow-list and the limit clamp.
    pub(crate) fn into_params(self, policy: &TriggerPolicy) -> Result<IngestParams, ApiError> {
        let keyword = self
            .keyword
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ApiError::bad_request("keyword is required"))?;

        Ok(IngestParams {
            keyword,
            country: policy.effective_country(self.country.as_deref()),
            limit: policy.effective_limit(self.limit.as_ref().and_then(requested_limit)),
            platform: self.platform.unwrap_or_default(),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn requested_limit(raw: &Value) -> Option<i64> {
    let number = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then(|| number.trunc() as i64)
}

/// Unwraps a JSON body, turning extractor rejections into `400 {error}`.
pub(crate) fn parse_body(
    payload: Result<Json<TriggerRequest>, JsonRejection>,
    policy: &TriggerPolicy,
) -> Result<IngestParams, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    body.into_params(policy)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn trigger_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/smart-task", post(trigger::smart_task))
        .route("/api/scraper", post(stream::scraper))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(trigger_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "requestId": req_id.0 }))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
