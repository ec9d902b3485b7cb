//! Shared fixtures for integration tests
#![allow(dead_code)]

use aiqcli::document::cluster::EFFICIENCY_RATIO_FIELD;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

pub const ACCESS_TOKEN: &str = "test-access-token";

pub fn system(hostname: &str, serial: &str) -> Value {
    json!({
        "hostname": hostname,
        "platform_type": "FAS8200",
        "system_id": format!("id-{serial}"),
        "serial_number": serial,
        "model": "FAS8200",
        "operating_mode": "Cluster-Mode",
        "version": "9.8P4"
    })
}

/// Two systems, `S1` and `S2`.
pub fn inventory_doc() -> Value {
    json!({"results": [system("filer01", "S1"), system("filer02", "S2")]})
}

/// Only `S1`, at 72% in `current_90`.
pub fn capacity_doc() -> Value {
    json!({"capacity": {"aggregates": {"current_90": [{
        "serial_number": "S1",
        "hostname": "filer01",
        "used_capacity_GB": 720,
        "percent_capacity": 72,
        "allocated_capacity_GB": 1000
    }]}}})
}

pub fn cluster_summary_doc() -> Value {
    json!({"data": [{"cluster_name": "prod-a", "node_count": 3}]})
}

pub fn resolver_doc(nodes: &[(&str, &str)]) -> Value {
    let nodes: Vec<Value> = nodes
        .iter()
        .map(|(name, serial)| json!({"name": name, "serial": serial, "model": "AFF-A400"}))
        .collect();
    json!({"clusters": [{"nodes": nodes}]})
}

pub fn efficiency_doc(hostname: &str, ratio: f64) -> Value {
    json!({"efficiency": {"systems": {"system": [
        {"hostname": hostname, EFFICIENCY_RATIO_FIELD: ratio}
    ]}}})
}

type Fixtures = Arc<HashMap<String, Value>>;

async fn serve_fixture(
    State(fixtures): State<Fixtures>,
    headers: HeaderMap,
    uri: Uri,
) -> (StatusCode, Json<Value>) {
    let path = uri.path();
    let is_token_exchange = path == "/v1/tokens/accessToken";
    let authorized = headers
        .get("authorizationtoken")
        .and_then(|v| v.to_str().ok())
        == Some(ACCESS_TOKEN);

    if !is_token_exchange && !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthorized"})),
        );
    }

    match fixtures.get(path) {
        Some(document) => (StatusCode::OK, Json(document.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("No such resource: {path}")})),
        ),
    }
}

fn fixture_router(fixtures: HashMap<String, Value>) -> Router {
    Router::new()
        .fallback(serve_fixture)
        .with_state(Arc::new(fixtures))
}

/// Serve `fixtures` (keyed by absolute path) on an ephemeral port.
pub async fn spawn_fixture_server(fixtures: HashMap<String, Value>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, fixture_router(fixtures)).await.unwrap();
    });
    addr
}

/// Same as [`spawn_fixture_server`], for synchronous tests: the server runs
/// on its own thread and runtime for the rest of the test process.
pub fn spawn_fixture_server_blocking(fixtures: HashMap<String, Value>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, fixture_router(fixtures)).await.unwrap();
        });
    });
    addr
}

/// Fixtures for the standard inventory and three-node cluster scenarios.
pub fn standard_fixtures() -> HashMap<String, Value> {
    let mut fixtures = HashMap::new();
    fixtures.insert(
        "/v1/systemList/aggregate/level/customer/id/1001".to_string(),
        inventory_doc(),
    );
    fixtures.insert(
        "/v2/capacity/details/level/customer/id/1001".to_string(),
        capacity_doc(),
    );
    fixtures.insert(
        "/v1/clusterview/get-cluster-summary/prod-a".to_string(),
        cluster_summary_doc(),
    );
    fixtures.insert(
        "/v1/clusterview/resolver/prod-a".to_string(),
        resolver_doc(&[("node-a", "NA"), ("node-b", "NB"), ("node-c", "NC")]),
    );
    for (serial, hostname, ratio) in [("NA", "node-a", 0.8), ("NB", "node-b", 0.6), ("NC", "node-c", 0.4)] {
        fixtures.insert(
            format!("/v1/efficiency/summary/level/serial_numbers/id/{serial}"),
            efficiency_doc(hostname, ratio),
        );
    }
    fixtures.insert(
        "/v1/tokens/accessToken".to_string(),
        json!({"access_token": ACCESS_TOKEN, "refresh_token": "rotated-refresh"}),
    );
    fixtures
}
