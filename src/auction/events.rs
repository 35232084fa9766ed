use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 서버가 뷰어에게 내보내는 이벤트.
/// `type` 태그로 구분되는 JSON 객체 하나가 SSE 메시지 하나로 전달된다.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AuctionEvent {
    // 접속 직후 보내는 연결 확인 이벤트
    Connection { message: String },
    // 입찰 반영 이벤트
    BidUpdate {
        auction_id: i64,
        current_bid: i64,
        current_bidder: String,
        timestamp: DateTime<Utc>,
    },
    // 채팅 메시지 이벤트 (auction_id 0은 전체 채팅)
    ChatMessage {
        auction_id: i64,
        author: String,
        text: String,
        timestamp: DateTime<Utc>,
        id: i64,
    },
    // 경매 시작 이벤트
    AuctionStarted { auction_id: i64, title: String },
    // 경매 종료 이벤트 (입찰자가 없었으면 winner는 null)
    AuctionEnded {
        auction_id: i64,
        winner: Option<String>,
        final_bid: i64,
        title: String,
    },
    // 남은 시간 이벤트 (5초 간격, 마지막 10초 동안은 매초)
    TimerUpdate { auction_id: i64, time_left: i64 },
}
