use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::TimeDelta;
use tokio::sync::Mutex;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use treesignal_color::{AssignmentMode, ColorService, InheritanceMode};
use treesignal_layout::LayoutGenerator;
use treesignal_tree::ChannelTree;

use crate::api;
use crate::config::{ClientConfig, TreeSignalConfig};
use crate::util::http::handle_panic;

/// Cheaply cloneable handle shared by every handler and the cleanup task.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<Mutex<ServerState>>,
    pub client: Arc<ClientConfig>,
}

/// Everything mutable: the channel tree and the layout generator (which
/// owns the colour service). Guarded by the one process-wide lock; tree
/// operations are CPU-bound and never suspend while holding it.
pub struct ServerState {
    pub tree: ChannelTree,
    pub layout: LayoutGenerator,
}

impl AppState {
    pub fn new(config: &TreeSignalConfig) -> Self {
        let assignment: AssignmentMode = config
            .client
            .colors
            .assignment_mode
            .parse()
            .unwrap_or_else(|err| {
                warn!(%err, "bad configured assignment mode, using increment");
                AssignmentMode::Increment
            });
        let inheritance: InheritanceMode = config
            .client
            .colors
            .inheritance_mode
            .parse()
            .unwrap_or_else(|err| {
                warn!(%err, "bad configured inheritance mode, using unique");
                InheritanceMode::Unique
            });

        let mut tree = ChannelTree::new().with_history_capacity(config.history.max_messages);
        tree.configure_decay(
            seconds_delta(config.decay.hold_seconds),
            seconds_delta(config.decay.decay_seconds),
        );
        let layout = LayoutGenerator::new(ColorService::new(assignment, inheritance));

        Self {
            inner: Arc::new(Mutex::new(ServerState { tree, layout })),
            client: Arc::new(config.client.clone()),
        }
    }
}

pub(crate) fn seconds_delta(seconds: f64) -> TimeDelta {
    TimeDelta::milliseconds((seconds * 1000.0) as i64)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::meta::root_info))
        .route("/healthz", get(api::meta::healthz))
        .route("/v1/messages", post(api::messages::ingest_message))
        .route("/v1/messages/{channel}", get(api::messages::channel_history))
        .route("/v1/control/decay", post(api::control::update_decay))
        .route(
            "/v1/control/colors",
            post(api::control::update_colors).get(api::control::current_colors),
        )
        .route("/v1/control/prune", post(api::control::prune_channel))
        .route("/v1/layout", get(api::layout::current_layout))
        .route("/v1/client/config", get(api::meta::client_config))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
