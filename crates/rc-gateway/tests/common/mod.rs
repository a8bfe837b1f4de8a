use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;

// ---------------------------------------------------------------------------
// MockGasServer — configurable stand-in for the deployed script endpoint
// ---------------------------------------------------------------------------

struct ServerConfig {
    /// Canned reply per action name; unknown actions get a rejection reply.
    replies: HashMap<String, serde_json::Value>,
    /// When set, every request gets this exact status and body, bypassing
    /// action dispatch. Used for transport-failure tests.
    raw: Option<(u16, String)>,
}

pub struct MockGasServer {
    addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockGasServer {
    pub async fn start(replies: &[(&str, serde_json::Value)]) -> Self {
        let config = ServerConfig {
            replies: replies
                .iter()
                .map(|(action, reply)| (action.to_string(), reply.clone()))
                .collect(),
            raw: None,
        };
        Self::start_with(config).await
    }

    pub async fn start_raw(status: u16, body: &str) -> Self {
        let config = ServerConfig {
            replies: HashMap::new(),
            raw: Some((status, body.to_owned())),
        };
        Self::start_with(config).await
    }

    async fn start_with(config: ServerConfig) -> Self {
        let app = axum::Router::new()
            .route("/", post(gas_handler))
            .with_state(Arc::new(config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            _handle: handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockGasServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

async fn gas_handler(State(config): State<Arc<ServerConfig>>, body: Bytes) -> Response {
    if let Some((status, raw_body)) = &config.raw {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, raw_body.clone()).into_response();
    }

    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let action = parsed["action"].as_str().unwrap_or("");

    match config.replies.get(action) {
        Some(reply) => (StatusCode::OK, axum::Json(reply.clone())).into_response(),
        None => (
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "success": false,
                "error": format!("Unknown action: {action}"),
            })),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

pub const TEST_TOKEN: &str = "tok-9f2c41d8a7";

pub fn sample_portal_reply() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "requestId": "req-001",
        "candidateName": "Alex Mercer",
        "status": "CONSENT_GIVEN",
        "fields": [
            {"id": "q_performance", "type": "rating", "label": "Overall performance", "required": true},
            {"id": "sig", "type": "signature", "label": "Signature", "required": true}
        ]
    })
}

pub fn sample_requests_reply() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "requests": [
            {
                "requestId": "req-001",
                "candidateName": "Alex Mercer",
                "candidateEmail": "alex@example.com",
                "refereeName": "Jane Doe",
                "refereeEmail": "jane@acme.example",
                "status": "Sealed",
                "archived": false,
                "pdfUrl": "https://files.example/sealed/req-001.pdf"
            }
        ]
    })
}
