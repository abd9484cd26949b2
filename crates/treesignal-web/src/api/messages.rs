use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use treesignal_types::{ChannelPath, DEFAULT_LIFESPAN_SECONDS, Message, Severity};
use uuid::Uuid;

use crate::app::AppState;
use crate::api::schemas::{MessageAccepted, MessageIngress, MessageRecord};
use crate::util::http::detail_error;

/// `POST /v1/messages` — accept a message for inclusion in the channel
/// tree. The receive timestamp is assigned here; ordering between racing
/// requests falls to the state lock.
pub async fn ingest_message(State(state): State<AppState>, body: Bytes) -> Response {
    let request: MessageIngress = match serde_json::from_slice(&body) {
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
    let Ok(severity) = request.severity.parse::<Severity>() else {
        return detail_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid severity value");
    };

    let id = Uuid::new_v4().simple().to_string();
    let message = Message {
        id: id.clone(),
        channel,
        payload: request.payload,
        severity,
        received_at: Utc::now(),
        metadata: request.metadata,
        lifespan_seconds: DEFAULT_LIFESPAN_SECONDS,
    };

    let mut guard = state.inner.lock().await;
    guard.tree.ingest(message);
    drop(guard);

    (
        StatusCode::ACCEPTED,
        Json(MessageAccepted {
            id,
            status: "accepted",
        }),
    )
        .into_response()
}

/// `GET /v1/messages/{channel}` — recent history for a channel, oldest
/// first. Unknown channels yield an empty list.
pub async fn channel_history(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Response {
    let Ok(channel) = ChannelPath::parse(&channel) else {
        return detail_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "channel path must not be empty",
        );
    };

    let guard = state.inner.lock().await;
    let records: Vec<MessageRecord> = guard.tree.history(&channel).map(MessageRecord::from).collect();
    drop(guard);

    Json(records).into_response()
}
