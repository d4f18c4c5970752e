#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the mock gossip endpoint answers with.
#[derive(Clone, Debug)]
pub enum GossipReply {
    Nodes(Value),
    Status(u16),
    RpcError(String),
    Garbage,
}

#[derive(Debug)]
pub struct MockState {
    pub gossip: GossipReply,
    pub stats: Option<Value>,
    pub version: Option<Value>,
    pub methods: Vec<String>,
    pub geo: Value,
    pub geo_hosts: Vec<String>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub port: u16,
    pub state: Shared,
}

impl MockServer {
    pub fn gossip_url(&self) -> String {
        format!("http://127.0.0.1:{}/gossip", self.port)
    }

    pub fn set_gossip(&self, reply: GossipReply) {
        self.state.lock().unwrap().gossip = reply;
    }

    pub fn methods(&self) -> Vec<String> {
        self.state.lock().unwrap().methods.clone()
    }

    pub fn geo_url(&self) -> String {
        format!("http://127.0.0.1:{}/geo", self.port)
    }

    pub fn set_geo(&self, reply: Value) {
        self.state.lock().unwrap().geo = reply;
    }

    pub fn geo_hosts(&self) -> Vec<String> {
        self.state.lock().unwrap().geo_hosts.clone()
    }
}

fn envelope(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

async fn gossip(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, String) {
    let mut state = state.lock().unwrap();
    let method = body["method"].as_str().unwrap_or_default().to_string();
    state.methods.push(method);
    let id = body["id"].clone();

    match state.gossip.clone() {
        GossipReply::Nodes(nodes) => (StatusCode::OK, envelope(&id, nodes).to_string()),
        GossipReply::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            String::new(),
        ),
        GossipReply::RpcError(message) => (
            StatusCode::OK,
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": -32601, "message": message } })
                .to_string(),
        ),
        GossipReply::Garbage => (StatusCode::OK, "<html>not json</html>".to_string()),
    }
}

async fn seed(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, String) {
    let mut state = state.lock().unwrap();
    let method = body["method"].as_str().unwrap_or_default().to_string();
    state.methods.push(method.clone());
    let id = body["id"].clone();

    let result = match method.as_str() {
        "get-stats" => state.stats.clone(),
        "get-version" => state.version.clone(),
        _ => None,
    };

    match result {
        Some(result) => (StatusCode::OK, envelope(&id, result).to_string()),
        None => (StatusCode::SERVICE_UNAVAILABLE, String::new()),
    }
}

async fn geo(State(state): State<Shared>, Path(host): Path<String>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.geo_hosts.push(host);
    Json(state.geo.clone())
}

/// Serves `/gossip` as the primary endpoint, `/rpc` as a seed host and `/geo/:host`
/// as an ip-api stand-in on 127.0.0.1.
/// Returns `None` when the sandbox does not allow binding.
pub async fn start(gossip_reply: GossipReply, stats: Option<Value>, version: Option<Value>) -> Option<MockServer> {
    let state: Shared = Arc::new(Mutex::new(MockState {
        gossip: gossip_reply,
        stats,
        version,
        methods: Vec::new(),
        geo: json!({ "status": "fail" }),
        geo_hosts: Vec::new(),
    }));

    let app = Router::new()
        .route("/gossip", post(gossip))
        .route("/rpc", post(seed))
        .route("/geo/:host", get(geo))
        .with_state(state.clone());

    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping test: tcp bind not permitted in this environment");
            return None;
        }
        Err(err) => panic!("bind failed: {}", err),
    };
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    Some(MockServer { port, state })
}

pub fn sample_stats() -> Value {
    json!({
        "active_streams": 2,
        "cpu_percent": 7.891,
        "current_index": 12,
        "file_size": 3_400_000_000u64,
        "last_updated": 1_700_000_000,
        "packets_received": 10,
        "packets_sent": 11,
        "ram_total": 16_000_000_000u64,
        "ram_used": 4_000_000_000u64,
        "total_bytes": 5000,
        "total_pages": 4,
        "uptime": 3600,
        "version": "stale"
    })
}
