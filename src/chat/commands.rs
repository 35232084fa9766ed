/// 채팅 커맨드 처리.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::broadcast::BroadcastHub;
use crate::chat::model::ChatMessage;
use crate::store::{StoreError, StoreManager};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
// endregion: --- Imports

// region:    --- Commands

/// 채팅 메시지 등록 명령.
/// auctionId가 없거나 0이면 전체 채팅으로 취급한다.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageCommand {
    #[serde(default)]
    pub auction_id: Option<i64>,
    pub author: String,
    pub text: String,
}

/// 채팅 처리 오류. BidError와 같은 구조.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("채팅 거절")]
    Rejected(serde_json::Value),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 채팅 메시지 등록.
/// 작성자와 내용이 비어 있지 않으면 저장하고, 저장된 메시지를 그대로
/// 이벤트로 내보낸 뒤 호출자에게 돌려준다. 경매 id는 검증하지 않는다.
/// 이미 끝난 경매의 채팅방에도 글은 남길 수 있다.
pub async fn handle_add_message(
    cmd: AddMessageCommand,
    store: &StoreManager,
    hub: &BroadcastHub,
) -> Result<ChatMessage, ChatError> {
    info!("{:<12} --> 채팅 요청 처리 시작: {:?}", "Command", cmd);

    if cmd.author.trim().is_empty() {
        return Err(ChatError::Rejected(serde_json::json!({
            "error": "작성자 정보가 비어 있습니다.",
            "code": "INVALID_MESSAGE"
        })));
    }
    if cmd.text.trim().is_empty() {
        return Err(ChatError::Rejected(serde_json::json!({
            "error": "메시지 내용이 비어 있습니다.",
            "code": "INVALID_MESSAGE"
        })));
    }

    // 0은 전체 채팅을 뜻하는 값이므로 저장할 때는 키를 비워 둔다
    let auction_id = cmd.auction_id.filter(|id| *id != 0);
    let now = Utc::now();
    let stored = store
        .transaction(|db| {
            let message = ChatMessage {
                id: db.next_message_id(),
                auction_id,
                author: cmd.author,
                text: cmd.text,
                timestamp: now,
            };
            db.chat_messages.push(message.clone());
            (message, true)
        })
        .await?;

    hub.broadcast(&AuctionEvent::ChatMessage {
        auction_id: stored.auction_id.unwrap_or(0),
        author: stored.author.clone(),
        text: stored.text.clone(),
        timestamp: stored.timestamp,
        id: stored.id,
    });

    info!("{:<12} --> 채팅 메시지 등록 완료: {}", "Command", stored.id);
    Ok(stored)
}

// endregion: --- Commands
