use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app::AppState;
use crate::api::schemas::ServiceInfo;
use crate::config::ClientConfig;

/// `GET /healthz` — heartbeat for deployment tooling.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /` — service identity for humans poking at the port.
pub async fn root_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "tree-signal",
        status: "ok",
        version: state.client.version.clone(),
    })
}

/// `GET /v1/client/config` — the client-visible configuration subtree.
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json((*state.client).clone())
}
