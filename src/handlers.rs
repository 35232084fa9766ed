// region:    --- Imports
use crate::bidding::commands::{handle_place_bid, BidError, PlaceBidCommand};
use crate::broadcast::{BroadcastHub, ViewerStream};
use crate::chat::commands::{
    handle_add_message as command_handle_add_message, AddMessageCommand, ChatError,
};
use crate::store::StoreManager;
use axum::extract::State;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Routes

/// 라우터 구성. CORS 레이어는 main에서 감싼다.
pub fn routes(store: Arc<StoreManager>, hub: Arc<BroadcastHub>) -> Router {
    Router::new()
        .route("/events", get(handle_events))
        .route("/update-bid", post(handle_update_bid))
        .route("/add-message", post(handle_add_message))
        .with_state((store, hub))
}

// endregion: --- Routes

// region:    --- Event Stream Handler

/// SSE 구독 처리.
/// 스트림의 첫 이벤트는 연결 확인 메시지이고, 이후 허브가 내보내는 모든
/// 이벤트를 받은 순서대로 전달한다. 연결이 끊기면 스트림이 버려지면서
/// 허브 등록도 함께 해제된다.
pub async fn handle_events(
    State((_, hub)): State<(Arc<StoreManager>, Arc<BroadcastHub>)>,
) -> impl IntoResponse {
    let stream = ViewerStream::new(Arc::clone(&hub));
    info!(
        "{:<12} --> SSE 구독 시작: 연결 {} (현재 {}명)",
        "SSE",
        stream.connection_id(),
        hub.viewer_count()
    );
    Sse::new(stream).keep_alive(KeepAlive::default())
}

// endregion: --- Event Stream Handler

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_update_bid(
    State((store, hub)): State<(Arc<StoreManager>, Arc<BroadcastHub>)>,
    Json(cmd): Json<PlaceBidCommand>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    match handle_place_bid(cmd, &store, &hub).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(BidError::Rejected(body)) => {
            (axum::http::StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(BidError::Store(e)) => {
            error!("{:<12} --> 입찰 저장 실패: {:?}", "Command", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to update bid" })),
            )
                .into_response()
        }
    }
}

/// 채팅 메시지 등록 요청 처리
pub async fn handle_add_message(
    State((store, hub)): State<(Arc<StoreManager>, Arc<BroadcastHub>)>,
    Json(cmd): Json<AddMessageCommand>,
) -> impl IntoResponse {
    info!("{:<12} --> 채팅 요청 처리 시작: {:?}", "Command", cmd);

    match command_handle_add_message(cmd, &store, &hub).await {
        Ok(message) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({ "success": true, "message": message })),
        )
            .into_response(),
        Err(ChatError::Rejected(body)) => {
            (axum::http::StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(ChatError::Store(e)) => {
            error!("{:<12} --> 채팅 저장 실패: {:?}", "Command", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to add message" })),
            )
                .into_response()
        }
    }
}

// endregion: --- Command Handlers
