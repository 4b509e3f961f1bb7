//! In-process stand-in for the document chat backend, used by tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Clone)]
pub struct MockConfig {
    pub upload_status: u16,
    pub upload_body: Value,
    pub chat_status: u16,
    pub chat_body: Value,
    pub reset_status: u16,
    pub reset_body: Value,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            upload_status: 200,
            upload_body: json!({"message": "File uploaded, indexed, and ready for chat."}),
            chat_status: 200,
            chat_body: json!({"answer": "It is about testing.", "source": "file"}),
            reset_status: 200,
            reset_body: json!({"message": "Session reset successfully."}),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hits {
    pub upload: usize,
    pub chat: usize,
    pub reset: usize,
}

struct MockState {
    config: MockConfig,
    upload_hits: AtomicUsize,
    chat_hits: AtomicUsize,
    reset_hits: AtomicUsize,
    questions: Mutex<Vec<String>>,
    last_upload: Mutex<Vec<u8>>,
}

pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start(config: MockConfig) -> Self {
        let state = Arc::new(MockState {
            config,
            upload_hits: AtomicUsize::new(0),
            chat_hits: AtomicUsize::new(0),
            reset_hits: AtomicUsize::new(0),
            questions: Mutex::new(Vec::new()),
            last_upload: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/upload", post(upload))
            .route("/chat", post(chat))
            .route("/reset", post(reset))
            .route("/api/health", get(health))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Hits {
        Hits {
            upload: self.state.upload_hits.load(Ordering::SeqCst),
            chat: self.state.chat_hits.load(Ordering::SeqCst),
            reset: self.state.reset_hits.load(Ordering::SeqCst),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.state.questions.lock().unwrap().clone()
    }

    pub fn last_upload_body(&self) -> String {
        String::from_utf8_lossy(&self.state.last_upload.lock().unwrap()).into_owned()
    }
}

/// A local URL with nothing listening behind it
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("free port address");
    drop(listener);
    format!("http://{}", addr)
}

fn reply(status: u16, body: &Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).expect("valid mock status"),
        Json(body.clone()),
    )
}

async fn upload(State(state): State<Arc<MockState>>, body: Bytes) -> (StatusCode, Json<Value>) {
    state.upload_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_upload.lock().unwrap() = body.to_vec();
    reply(state.config.upload_status, &state.config.upload_body)
}

async fn chat(
    State(state): State<Arc<MockState>>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.chat_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(question) = request.get("question").and_then(Value::as_str) {
        state.questions.lock().unwrap().push(question.to_string());
    }
    reply(state.config.chat_status, &state.config.chat_body)
}

async fn reset(State(state): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
    state.reset_hits.fetch_add(1, Ordering::SeqCst);
    reply(state.config.reset_status, &state.config.reset_body)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "XplainDfile backend running"}))
}
