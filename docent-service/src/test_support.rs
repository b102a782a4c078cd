//! In-process stand-in for the Gemini API, plus helpers shared by unit tests.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path as UrlPath, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::Engine;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::config::DocentConfig;
use crate::service::DocentService;

/// Three pages: "First page", an empty page, then "Third page"
pub static THREE_PAGE_PDF: &[u8] = include_bytes!("../tests/fixtures/three_pages.pdf");

/// PDF extraction tests need libpdfium at runtime and return early without it
pub fn pdfium_available() -> bool {
    crate::ingestion::pdf::create_pdfium(None).is_ok()
}

/// How the mock answers `generateContent`
pub enum MockBehavior {
    /// Answer `text:<text>` or `image:<mime>:<bytes>` for the payload part.
    /// Payloads containing "slow" are delayed.
    Echo,
    /// Fail every request
    Fail { status: u16, message: String },
    /// Fail requests whose payload contains `needle`, echo the rest
    FailWhenContains {
        needle: String,
        status: u16,
        message: String,
    },
}

/// A `generateContent` call as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub api_key: Option<String>,
    pub body: Value,
}

pub struct MockGemini {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockGemini {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    behavior: Arc<MockBehavior>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Serve a mock Gemini API on an ephemeral loopback port
pub async fn spawn_mock_gemini(behavior: MockBehavior) -> MockGemini {
    let state = MockState {
        behavior: Arc::new(behavior),
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route(
            "/v1beta/models/{target}",
            get(model_handler).post(generate_handler),
        )
        .layer(DefaultBodyLimit::disable())
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockGemini {
        base_url: format!("http://{}", addr),
        requests: state.requests,
    }
}

/// Service wired to `mock`, storing uploads under `upload_dir`
pub async fn test_service(
    mock: &MockGemini,
    upload_dir: &Path,
    page_concurrency: usize,
) -> DocentService {
    let mut config = DocentConfig::default();
    config.storage.upload_dir = upload_dir.to_path_buf();
    config.gemini.base_url = mock.base_url.clone();
    config.gemini.api_key = Some("test-key".to_string());
    config.gemini.model = "gemini-test".to_string();
    config.prompting.page_concurrency = page_concurrency;

    DocentService::new(Arc::new(config)).await.unwrap()
}

/// Encode `(name, filename, data)` fields as `multipart/form-data`.
/// Returns the content type header value and the body.
pub fn multipart_body(fields: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "docent-test-boundary";

    let mut body = Vec::new();
    for (name, filename, data) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

async fn model_handler(UrlPath(target): UrlPath<String>, headers: HeaderMap) -> Response {
    if headers.get("x-goog-api-key").is_none() {
        return error_response(403, "Method doesn't allow unregistered callers");
    }
    Json(json!({ "name": format!("models/{}", target) })).into_response()
}

async fn generate_handler(
    State(state): State<MockState>,
    UrlPath(target): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !target.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(RecordedRequest {
        api_key,
        body: body.clone(),
    });

    let parts = body["contents"][0]["parts"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let payload = parts.get(1).or(parts.first()).cloned().unwrap_or(Value::Null);
    let echoed = describe_part(&payload);

    match state.behavior.as_ref() {
        MockBehavior::Fail { status, message } => return error_response(*status, message),
        MockBehavior::FailWhenContains {
            needle,
            status,
            message,
        } if echoed.contains(needle.as_str()) => return error_response(*status, message),
        _ => {}
    }

    if echoed.contains("slow") {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": echoed }] },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

fn describe_part(part: &Value) -> String {
    if let Some(text) = part["text"].as_str() {
        format!("text:{}", text)
    } else if let Some(data) = part["inlineData"]["data"].as_str() {
        let len = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map(|d| d.len())
            .unwrap_or(0);
        format!(
            "image:{}:{}",
            part["inlineData"]["mimeType"].as_str().unwrap_or(""),
            len
        )
    } else {
        String::new()
    }
}

fn error_response(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": "ERROR" }
        })),
    )
        .into_response()
}
