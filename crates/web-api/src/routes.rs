use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use application::UploadRequest;
use domain::ServerEvent;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::websocket;

/// multipart 分隔符等封装开销的余量
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: &'static str,
    message_id: i64,
    url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/messages", get(get_messages))
        .route("/api/upload", post(upload))
        .route("/ws", get(websocket::upgrade))
        .layer(DefaultBodyLimit::max(
            state.max_upload_bytes + MULTIPART_OVERHEAD,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 最近的历史消息，从旧到新，形状与实时出站帧一致
async fn get_messages(
    State(state): State<AppState>,
    AuthenticatedUser(_identity): AuthenticatedUser,
) -> Result<Json<Vec<ServerEvent>>, ApiError> {
    let events = state.chat_service.recent_messages().await?;
    Ok(Json(events))
}

/// 文件上传：multipart 的 `file` 字段经上传中继转发给媒体引擎
async fn upload(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Unable to parse form"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("Unable to read file field"))?;

        if data.len() > state.max_upload_bytes {
            return Err(ApiError::bad_request("File exceeds the maximum upload size"));
        }

        let outcome = state
            .upload_relay
            .relay(
                &identity,
                UploadRequest {
                    file_name,
                    content_type,
                    data,
                },
            )
            .await?;

        return Ok(Json(UploadResponse {
            message: "File uploaded and saved to database!",
            message_id: outcome.message_id,
            url: outcome.url,
        }));
    }

    Err(ApiError::bad_request("Missing 'file' field"))
}
