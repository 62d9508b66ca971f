use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::{ApiError, ApiException},
    protocol::{
        ExplanationMetadata, ExplanationResponse, ServiceBanner, TopicRequest,
        EXPLAIN_TOPIC_PATH,
    },
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::{error, info, warn};

use crate::{
    app_state::AppState,
    model_output::parse_model_output,
    prompt::{build_prompt, SYSTEM_MESSAGE},
    provider::CompletionRequest,
};

pub const MAX_TOPIC_CHARS: usize = 500;
const MAX_REQUEST_BYTES: usize = 16 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn reject(status: StatusCode, exception: ApiException) -> (StatusCode, Json<ApiError>) {
    (status, Json(exception.into()))
}

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route(&format!("/{EXPLAIN_TOPIC_PATH}"), post(explain_topic))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

/// `*` allows any origin; otherwise only the listed origins are allowed.
pub(crate) fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn root() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        message: "Topic explanation service is running".to_string(),
    })
}

async fn healthz() -> &'static str {
    "ok"
}

fn validate_topic(topic: &str) -> Result<(), ApiException> {
    if topic.trim().is_empty() {
        return Err(ApiException::validation("topic must not be empty"));
    }
    let chars = topic.chars().count();
    if chars > MAX_TOPIC_CHARS {
        return Err(ApiException::validation(format!(
            "topic must be at most {MAX_TOPIC_CHARS} characters, got {chars}"
        )));
    }
    Ok(())
}

async fn explain_topic(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TopicRequest>,
) -> ApiResult<ExplanationResponse> {
    validate_topic(&req.topic).map_err(|e| reject(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    let complexity_level = req.complexity_level.unwrap_or_default();
    let prompt = build_prompt(
        &req.topic,
        complexity_level,
        req.include_examples.unwrap_or(true),
    );
    let prompt_length = prompt.len();

    let completion = state
        .provider
        .complete(CompletionRequest {
            prompt,
            system_message: Some(SYSTEM_MESSAGE.to_string()),
            model: state.generation.model.clone(),
            temperature: state.generation.temperature,
            max_tokens: state.generation.max_tokens,
        })
        .await
        .map_err(|e| {
            error!(topic = %req.topic, error = %e, "completion provider failed");
            reject(
                StatusCode::BAD_GATEWAY,
                ApiException::upstream(format!("completion provider error: {e}")),
            )
        })?;

    let result = parse_model_output(&completion.text).map_err(|e| {
        error!(topic = %req.topic, error = %e, "model response failed validation");
        reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiException::validation(format!("response validation error: {e}")),
        )
    })?;

    info!(
        topic = %req.topic,
        test_cases = result.test_cases.len(),
        "processed topic"
    );
    Ok(Json(ExplanationResponse {
        result,
        topic: req.topic,
        complexity_level,
        metadata: ExplanationMetadata {
            model_used: completion.model,
            prompt_length,
            response_length: completion.text.len(),
            prompt_tokens: completion.usage.prompt_tokens,
            completion_tokens: completion.usage.completion_tokens,
            tokens_used: completion.usage.total_tokens,
        },
    }))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
