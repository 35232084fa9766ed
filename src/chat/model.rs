use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 채팅 메시지 모델. auction_id가 없으면 전체(글로벌) 채팅이며,
// 저장 파일에서도 키 자체가 생략된다.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<i64>,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}
