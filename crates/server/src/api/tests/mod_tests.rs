use super::*;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Request},
};
use shared::{error::ErrorCode, protocol::TopicResult};
use tower::ServiceExt;

use crate::{
    app_state::GenerationSettings,
    provider::{Completion, CompletionProvider, TokenUsage},
};

const MODEL_JSON: &str = r#"Sure! ```json
{
  "explanation": "Photosynthesis is the process by which green plants use sunlight, water and carbon dioxide to produce glucose and oxygen inside their chloroplasts.",
  "test_cases": [
    {
      "question": "Which gas do plants release?",
      "options": ["Nitrogen", "Oxygen", "Helium"],
      "correct_answer": "B",
      "explanation": "Oxygen is a by-product of splitting water."
    }
  ]
}
```"#;

struct FakeProvider {
    reply: Result<&'static str, &'static str>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    fn replying(text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<Completion> {
        let model = request.model.clone();
        self.requests.lock().expect("lock").push(request);
        match self.reply {
            Ok(text) => Ok(Completion {
                text: text.to_string(),
                model,
                usage: TokenUsage {
                    prompt_tokens: 120,
                    completion_tokens: 80,
                    total_tokens: 200,
                },
            }),
            Err(message) => Err(anyhow!(message)),
        }
    }
}

fn test_app(provider: Arc<FakeProvider>) -> Router {
    build_router(Arc::new(AppState {
        provider,
        generation: GenerationSettings {
            model: "gemini-test".to_string(),
            temperature: 0.2,
            max_tokens: 900,
        },
    }))
}

fn post_topic(body: serde_json::Value) -> Request<Body> {
    Request::post("/explain-topic")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_and_root_respond() {
    let app = test_app(FakeProvider::replying(MODEL_JSON));

    let response = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let banner: ServiceBanner = json_body(response).await;
    assert_eq!(banner.message, "Topic explanation service is running");
}

#[tokio::test]
async fn explain_topic_returns_result_shape_with_metadata() {
    let provider = FakeProvider::replying(MODEL_JSON);
    let app = test_app(Arc::clone(&provider));

    let response = app
        .oneshot(post_topic(serde_json::json!({ "topic": "photosynthesis" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = json_body(response).await;
    let result: TopicResult = serde_json::from_value(body.clone()).expect("result shape");
    assert_eq!(result.test_cases.len(), 1);
    assert_eq!(result.test_cases[0].correct_answer, "B");
    assert_eq!(body["topic"], "photosynthesis");
    assert_eq!(body["complexity_level"], "intermediate");
    assert_eq!(body["metadata"]["model_used"], "gemini-test");
    assert_eq!(body["metadata"]["tokens_used"], 200);

    let requests = provider.requests.lock().expect("lock");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Topic: photosynthesis"));
    assert!(requests[0].prompt.contains("Include practical examples"));
    assert_eq!(requests[0].max_tokens, 900);
    assert_eq!(requests[0].system_message.as_deref(), Some(SYSTEM_MESSAGE));
}

#[tokio::test]
async fn explain_topic_honours_complexity_and_examples() {
    let provider = FakeProvider::replying(MODEL_JSON);
    let app = test_app(Arc::clone(&provider));

    let response = app
        .oneshot(post_topic(serde_json::json!({
            "topic": "photosynthesis",
            "complexity_level": "beginner",
            "include_examples": false
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let requests = provider.requests.lock().expect("lock");
    assert!(requests[0].prompt.contains("Complexity Level: beginner"));
    assert!(requests[0].prompt.contains("Focus on theoretical concepts"));
}

#[tokio::test]
async fn empty_or_overlong_topic_is_rejected() {
    let provider = FakeProvider::replying(MODEL_JSON);
    let app = test_app(Arc::clone(&provider));

    let response = app
        .clone()
        .oneshot(post_topic(serde_json::json!({ "topic": "   " })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ApiError = json_body(response).await;
    assert_eq!(error.code, ErrorCode::Validation);

    let response = app
        .oneshot(post_topic(
            serde_json::json!({ "topic": "a".repeat(MAX_TOPIC_CHARS + 1) }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert!(provider.requests.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn provider_failure_maps_to_bad_gateway() {
    let app = test_app(FakeProvider::failing("quota exhausted"));

    let response = app
        .oneshot(post_topic(serde_json::json!({ "topic": "photosynthesis" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let error: ApiError = json_body(response).await;
    assert_eq!(error.code, ErrorCode::Upstream);
    assert!(error.message.contains("quota exhausted"));
}

#[tokio::test]
async fn unusable_model_output_is_a_validation_error() {
    let app = test_app(FakeProvider::replying("I cannot help with that."));

    let response = app
        .oneshot(post_topic(serde_json::json!({ "topic": "photosynthesis" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ApiError = json_body(response).await;
    assert_eq!(error.code, ErrorCode::Validation);
    assert!(error.message.starts_with("response validation error"));
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let app = test_app(FakeProvider::replying(MODEL_JSON))
        .layer(cors_layer(&["http://localhost:5173".to_string()]));

    let preflight = |origin: &str| {
        Request::options("/explain-topic")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .expect("request")
    };

    let response = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .expect("response");
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );

    let response = app
        .oneshot(preflight("https://evil.example"))
        .await
        .expect("response");
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
