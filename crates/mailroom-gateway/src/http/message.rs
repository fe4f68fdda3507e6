//! Message intake endpoints — POST /message and POST /message/{label}.
//!
//! Each request runs a straight line: rate-limit admission, multipart
//! intake, destination resolution, then delivery fanout. Text that fits the
//! caption limit rides on the first media item; longer text follows the
//! media group as its own message.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use mailroom_telegram::MediaUpload;

use crate::app::AppState;
use crate::caption::CaptionPlan;
use crate::intake::{self, IntakeError};
use crate::resolve::{ResolveChat, UnknownLabel};

type ErrorResponse = (StatusCode, Json<Value>);

/// POST /message — deliver to the default chat.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ErrorResponse> {
    deliver(&state, state.default_chat.as_ref(), None, multipart).await
}

/// POST /message/{label} — deliver to a configured chat.
pub async fn post_message_labelled(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ErrorResponse> {
    deliver(&state, state.labelled_chats.as_ref(), Some(&label), multipart).await
}

async fn deliver(
    state: &AppState,
    resolver: &dyn ResolveChat,
    label: Option<&str>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ErrorResponse> {
    // Admission first: a request that goes away while waiting here is simply
    // dropped by the server and never reaches the Bot API.
    state.limiter.acquire().await;

    let form = multipart.map_err(|err| {
        warn!(error = %err, "request body is not a usable multipart form");
        bad_request("invalid multipart payload")
    })?;

    let chat = resolver.resolve(label).map_err(|err| {
        warn!(label = %err.label, "chat lookup failed");
        lookup_error(&err)
    })?;

    let submission = intake::read_form(form).await.map_err(|err| {
        let message = match &err {
            IntakeError::Form(_) => "invalid multipart payload",
            IntakeError::File { .. } => "failed to read uploads",
        };
        warn!(chat_label = %chat.label, error = %err, "multipart intake failed");
        bad_request(message)
    })?;

    let text = submission.text;
    let uploads = submission.uploads;

    info!(
        chat_label = %chat.label,
        files = uploads.len(),
        has_text = !text.is_empty(),
        "incoming submission"
    );

    if uploads.is_empty() && text.is_empty() {
        info!(chat_label = %chat.label, "nothing to send, skipping");
        return Ok(StatusCode::NO_CONTENT);
    }

    if uploads.is_empty() {
        state.telegram.send_message(&chat.id, &text).await.map_err(|err| {
            error!(chat_label = %chat.label, error = %err, "send text message failed");
            internal_error("failed to deliver message")
        })?;
        info!(chat_label = %chat.label, chat_id = %chat.id, "delivered");
        return Ok(StatusCode::ACCEPTED);
    }

    let plan = CaptionPlan::for_text(&text);

    let manifest: Vec<(&str, &str)> = uploads
        .iter()
        .map(|u| (u.file_name.as_str(), u.content_type.as_str()))
        .collect();
    info!(chat_label = %chat.label, files = ?manifest, "sending files");

    let media: Vec<MediaUpload> = uploads
        .into_iter()
        .enumerate()
        .map(|(i, upload)| MediaUpload {
            kind: None,
            file_name: upload.file_name,
            content_type: upload.content_type,
            caption: if i == 0 { plan.caption.clone() } else { None },
            content: upload.content,
        })
        .collect();

    state.telegram.send_media_group(&chat.id, media).await.map_err(|err| {
        error!(chat_label = %chat.label, error = %err, "send media group failed");
        internal_error("failed to deliver media group")
    })?;

    if let Some(follow_up) = plan.follow_up {
        state.telegram.send_message(&chat.id, &follow_up).await.map_err(|err| {
            error!(chat_label = %chat.label, error = %err, "send text message after media group failed");
            // The group is already delivered; say so, so careful callers can
            // resubmit the text alone.
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "failed to deliver message text",
                    "media_delivered": true,
                })),
            )
        })?;
    }

    info!(chat_label = %chat.label, chat_id = %chat.id, "delivered");
    Ok(StatusCode::ACCEPTED)
}

fn bad_request(message: &str) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

fn internal_error(message: &str) -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": message})),
    )
}

fn lookup_error(err: &UnknownLabel) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": err.to_string(),
            "labels": err.labels,
        })),
    )
}
