//! In-process stub servers for the external enrichment services.
//!
//! Both clients take a configurable base URL, so tests point them at these
//! stubs and drive success and failure per request.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Stub for the ipinfo lookup service.
///
/// Serves `GET /lite/:ip` with a fixed annotation body, or 500 for any
/// address marked as failing. Every looked-up address is recorded.
#[derive(Clone)]
pub struct IpInfoStub {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

#[derive(Clone)]
struct IpInfoStubState {
    requests: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl IpInfoStub {
    pub async fn start() -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let failing = Arc::new(Mutex::new(HashSet::new()));

        let state = IpInfoStubState {
            requests: requests.clone(),
            failing: failing.clone(),
        };

        let router = Router::new()
            .route("/lite/:ip", get(ipinfo_lookup))
            .with_state(state);

        let url = serve(router).await;

        Self {
            url,
            requests,
            failing,
        }
    }

    /// Make lookups for this address return 500.
    pub fn fail_for(&self, ip: &str) {
        self.failing.lock().insert(ip.to_string());
    }

    /// Clear all induced failures.
    pub fn clear_failures(&self) {
        self.failing.lock().clear();
    }

    /// Addresses looked up so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

async fn ipinfo_lookup(
    State(state): State<IpInfoStubState>,
    Path(ip): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.requests.lock().push(ip.clone());

    if state.failing.lock().contains(&ip) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "upstream unavailable"})),
        );
    }

    (StatusCode::OK, Json(crate::fixtures::ipinfo_body(&ip)))
}

/// Stub for the Ollama-style inference endpoint.
///
/// Serves `POST /api/chat`, returning a queue of canned reply contents; when
/// the queue runs dry the last configured content repeats.
#[derive(Clone)]
pub struct LlmStub {
    pub url: String,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
    replies: Arc<Mutex<Vec<String>>>,
    fail_all: Arc<Mutex<bool>>,
}

#[derive(Clone)]
struct LlmStubState {
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
    replies: Arc<Mutex<Vec<String>>>,
    fail_all: Arc<Mutex<bool>>,
}

impl LlmStub {
    pub async fn start(initial_reply: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(Mutex::new(vec![initial_reply.to_string()]));
        let fail_all = Arc::new(Mutex::new(false));

        let state = LlmStubState {
            requests: requests.clone(),
            replies: replies.clone(),
            fail_all: fail_all.clone(),
        };

        let router = Router::new()
            .route("/api/chat", post(llm_chat))
            .with_state(state);

        let url = serve(router).await;

        Self {
            url,
            requests,
            replies,
            fail_all,
        }
    }

    /// Replace the reply queue; the last entry repeats once exhausted.
    pub fn set_replies(&self, contents: &[&str]) {
        *self.replies.lock() = contents.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_fail_all(&self, fail: bool) {
        *self.fail_all.lock() = fail;
    }

    /// Raw request bodies received so far.
    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

async fn llm_chat(
    State(state): State<LlmStubState>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.requests.lock().push(body);

    if *state.fail_all.lock() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "model unavailable"})),
        );
    }

    let content = {
        let mut replies = state.replies.lock();
        if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies
                .first()
                .cloned()
                .unwrap_or_else(|| r#"{"malicious":"low"}"#.to_string())
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": {"role": "assistant", "content": content}
        })),
    )
}

/// Bind a router on an ephemeral port and serve it in the background.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Stub server stopped");
    });

    format!("http://{}", addr)
}
