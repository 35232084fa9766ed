use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// 경매 상품 모델 (저장 파일과 동일한 camelCase 필드)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: String,
    pub base_price: i64,
    pub duration: i64,
    pub start_time: DateTime<Utc>,
    pub current_bid: i64,
    pub current_bidder: Option<String>,
    pub status: AuctionStatus,
}

impl Auction {
    // 종료 시각은 시작 시각 + 진행 시간(초).
    // 파일을 공유하는 외부 계층이 범위를 벗어난 duration을 넣을 수 있으므로
    // 표현할 수 없는 종료 시각은 None이다.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        Duration::try_seconds(self.duration)
            .and_then(|d| self.start_time.checked_add_signed(d))
    }
}

// 경매 상태. 시간이 지나도 뒤로 돌아가지 않는다 (upcoming -> active -> finished)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Upcoming,
    Active,
    Finished,
}

// 입찰 모델
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}
