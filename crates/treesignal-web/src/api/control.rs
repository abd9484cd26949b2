use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use treesignal_color::{AssignmentMode, ColorService, InheritanceMode};
use treesignal_types::ChannelPath;

use crate::app::{AppState, seconds_delta};
use crate::api::schemas::{ColorConfigBody, DecayConfigBody, PruneRequest};
use crate::util::http::detail_error;

/// Smallest accepted decay tail. Anything shorter would fade panels
/// before a dashboard refresh can observe them.
const MIN_DECAY_SECONDS: f64 = 0.1;

/// `POST /v1/control/decay` — update the hold/decay durations used for
/// future fade scheduling, echoing the applied values.
pub async fn update_decay(State(state): State<AppState>, body: Bytes) -> Response {
    let request: DecayConfigBody = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            return detail_error(
                StatusCode::BAD_REQUEST,
                format!("invalid request json: {error}"),
            );
        }
    };

    if request.hold_seconds <= 0.0 {
        return detail_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "hold_seconds must be greater than 0",
        );
    }
    if request.decay_seconds <= 0.0 {
        return detail_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "decay_seconds must be greater than 0",
        );
    }
    if request.decay_seconds < MIN_DECAY_SECONDS {
        return detail_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "decay_seconds must be at least 0.1 seconds",
        );
    }

    let mut guard = state.inner.lock().await;
    guard.tree.configure_decay(
        seconds_delta(request.hold_seconds),
        seconds_delta(request.decay_seconds),
    );
    drop(guard);

    Json(request).into_response()
}

/// `POST /v1/control/colors` — replace the colour service, resetting all
/// colour assignment state.
pub async fn update_colors(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ColorConfigBody = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            return detail_error(
                StatusCode::BAD_REQUEST,
                format!("invalid request json: {error}"),
            );
        }
    };

    let assignment = match request.assignment_mode.parse::<AssignmentMode>() {
        Ok(mode) => mode,
        Err(error) => return detail_error(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    };
    let inheritance = match request.inheritance_mode.parse::<InheritanceMode>() {
        Ok(mode) => mode,
        Err(error) => return detail_error(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    };

    let mut guard = state.inner.lock().await;
    guard
        .layout
        .replace_colors(ColorService::new(assignment, inheritance));
    drop(guard);

    Json(request).into_response()
}

/// `GET /v1/control/colors` — the colour configuration currently in
/// effect.
pub async fn current_colors(State(state): State<AppState>) -> Response {
    let guard = state.inner.lock().await;
    let colors = guard.layout.colors();
    let body = ColorConfigBody {
        assignment_mode: colors.assignment().to_string(),
        inheritance_mode: colors.inheritance().to_string(),
    };
    drop(guard);

    Json(body).into_response()
}

/// `POST /v1/control/prune` — remove a channel subtree. Pruning a path
/// that does not exist succeeds silently; producers prune best-effort.
pub async fn prune_channel(State(state): State<AppState>, body: Bytes) -> Response {
    let request: PruneRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            return detail_error(
                StatusCode::BAD_REQUEST,
                format!("invalid request json: {error}"),
            );
        }
    };

    let Ok(channel) = ChannelPath::parse(&request.channel) else {
        return detail_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "channel path must not be empty",
        );
    };

    let mut guard = state.inner.lock().await;
    let result = guard.tree.prune(&channel);
    drop(guard);

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => detail_error(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    }
}
