use axum::Json;
use axum::extract::State;
use chrono::Utc;
use treesignal_types::LayoutFrame;

use crate::app::{AppState, ServerState};

/// `GET /v1/layout` — the current frame list, generated at server UTC
/// now. Expired state is cleaned up inline before the walk.
pub async fn current_layout(State(state): State<AppState>) -> Json<Vec<LayoutFrame>> {
    let now = Utc::now();
    let mut guard = state.inner.lock().await;
    let ServerState { tree, layout } = &mut *guard;
    let frames = layout.generate(tree, now);
    drop(guard);
    Json(frames)
}
