// Shared fixtures for integration tests
#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Form, Json, State};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Router, body};
use serde_json::{Value, json};
use tokio::sync::oneshot;

use line_relay::config::{ResolvedConfig, Secrets};
use line_relay::line::{SIGNATURE_HEADER, signature};
use line_relay::server::{AppState, create_app};

pub const CHANNEL_SECRET: &str = "test-channel-secret";
pub const ACCESS_TOKEN: &str = "test-access-token";
pub const DEEPL_KEY: &str = "test-deepl-key";
pub const OPENAI_KEY: &str = "test-openai-key";

/// How the mock upstreams answer.
#[derive(Clone)]
pub struct MockBehavior {
    pub completion_content: String,
    pub completion_status: StatusCode,
    /// Fixed translation; `None` answers `[<target>] <text>`.
    pub translation_text: Option<String>,
    pub translation_empty: bool,
    pub reply_status: StatusCode,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            completion_content: "summary".to_string(),
            completion_status: StatusCode::OK,
            translation_text: None,
            translation_empty: false,
            reply_status: StatusCode::OK,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest<T> {
    pub authorization: Option<String>,
    pub body: T,
}

#[derive(Clone, Default)]
struct MockState {
    behavior: Arc<Mutex<MockBehavior>>,
    completions: Arc<Mutex<Vec<RecordedRequest<Value>>>>,
    translations: Arc<Mutex<Vec<RecordedRequest<HashMap<String, String>>>>>,
    replies: Arc<Mutex<Vec<RecordedRequest<Value>>>>,
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn completions_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.completions.lock().unwrap().push(RecordedRequest {
        authorization: authorization(&headers),
        body,
    });
    let behavior = state.behavior.lock().unwrap().clone();

    if !behavior.completion_status.is_success() {
        return (behavior.completion_status, "upstream exploded").into_response();
    }

    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo-0125",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": behavior.completion_content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
    .into_response()
}

async fn translate_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let behavior = state.behavior.lock().unwrap().clone();
    let text = behavior.translation_text.clone().unwrap_or_else(|| {
        format!(
            "[{}] {}",
            form.get("target_lang").cloned().unwrap_or_default(),
            form.get("text").cloned().unwrap_or_default()
        )
    });
    state.translations.lock().unwrap().push(RecordedRequest {
        authorization: authorization(&headers),
        body: form,
    });

    if behavior.translation_empty {
        return Json(json!({"translations": []})).into_response();
    }

    Json(json!({
        "translations": [{"detected_source_language": "FR", "text": text}]
    }))
    .into_response()
}

async fn reply_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.replies.lock().unwrap().push(RecordedRequest {
        authorization: authorization(&headers),
        body,
    });
    let status = state.behavior.lock().unwrap().reply_status;

    if status.is_success() {
        Json(json!({})).into_response()
    } else {
        (status, Json(json!({"message": "Invalid reply token"}))).into_response()
    }
}

/// In-process stand-in for the completion, translation and reply APIs.
pub struct MockUpstream {
    pub base_url: String,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn start(behavior: MockBehavior) -> Self {
        let state = MockState {
            behavior: Arc::new(Mutex::new(behavior)),
            ..MockState::default()
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(completions_handler))
            .route("/v2/translate", post(translate_handler))
            .route("/v2/bot/message/reply", post(reply_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                eprintln!("Mock upstream error: {e}");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn set_behavior(&self, update: impl FnOnce(&mut MockBehavior)) {
        update(&mut self.state.behavior.lock().unwrap());
    }

    pub fn completions(&self) -> Vec<RecordedRequest<Value>> {
        self.state.completions.lock().unwrap().clone()
    }

    pub fn translations(&self) -> Vec<RecordedRequest<HashMap<String, String>>> {
        self.state.translations.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<RecordedRequest<Value>> {
        self.state.replies.lock().unwrap().clone()
    }

    /// Texts sent through the reply API, in order.
    pub fn reply_texts(&self) -> Vec<String> {
        self.replies()
            .iter()
            .map(|r| r.body["messages"][0]["text"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn config(&self, max_history_messages: usize) -> ResolvedConfig {
        ResolvedConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            callback_path: "/callback".to_string(),
            completion_endpoint: self.base_url.clone(),
            model: "gpt-3.5-turbo".to_string(),
            completion_api_key: Some(OPENAI_KEY.to_string()),
            max_history_messages,
            translation_endpoint: format!("{}/v2/translate", self.base_url),
            target_language: "en".to_string(),
            reply_endpoint: format!("{}/v2/bot/message/reply", self.base_url),
            idle_ttl: None,
            sweep_interval: Duration::from_secs(60),
            timeout: Duration::from_secs(5),
            secrets: Secrets {
                channel_access_token: ACCESS_TOKEN.to_string(),
                channel_secret: CHANNEL_SECRET.to_string(),
                deepl_api_key: DEEPL_KEY.to_string(),
            },
        }
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// The relay under test, wired to a mock upstream.
pub struct TestRelay {
    pub state: Arc<AppState>,
    pub app: Router,
}

impl TestRelay {
    pub fn new(upstream: &MockUpstream) -> Self {
        Self::with_config(&upstream.config(0))
    }

    pub fn with_config(config: &ResolvedConfig) -> Self {
        let state = Arc::new(AppState::from_config(config).unwrap());
        let app = create_app(Arc::clone(&state), &config.callback_path);
        Self { state, app }
    }

    /// Posts a correctly signed webhook body and returns status and body text.
    pub async fn post_signed(&self, body: &Value) -> (StatusCode, String) {
        let raw = serde_json::to_vec(body).unwrap();
        let signature = signature::sign(CHANNEL_SECRET, &raw).unwrap();
        self.post_raw(raw, Some(&signature)).await
    }

    pub async fn post_raw(&self, raw: Vec<u8>, signature: Option<&str>) -> (StatusCode, String) {
        use tower::ServiceExt;

        let mut builder = Request::builder()
            .method("POST")
            .uri("/callback")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        let request = builder.body(Body::from(raw)).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Sends one text message from `user_id` and returns the response status.
    pub async fn send_text(&self, user_id: &str, text: &str) -> StatusCode {
        let token = format!("reply-token-{user_id}-{text}");
        self.post_signed(&webhook(vec![text_event(user_id, &token, text)]))
            .await
            .0
    }
}

pub fn text_event(user_id: &str, reply_token: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_u64,
        "webhookEventId": format!("evt-{reply_token}"),
        "deliveryContext": {"isRedelivery": false},
        "replyToken": reply_token,
        "source": {"type": "user", "userId": user_id},
        "message": {"id": "1", "type": "text", "text": text}
    })
}

pub fn webhook(events: Vec<Value>) -> Value {
    json!({"destination": "Ubot", "events": events})
}
