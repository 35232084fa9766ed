// region:    --- Imports
use crate::bidding::model::{Auction, Bid};
use crate::chat::model::ChatMessage;
use crate::store::{StoreError, StoreManager};
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 경매 조회
pub async fn get_auction(
    store: &StoreManager,
    auction_id: i64,
) -> Result<Option<Auction>, StoreError> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
    store
        .read(|db| db.auctions.iter().find(|a| a.id == auction_id).cloned())
        .await
}

/// 모든 경매 조회
pub async fn get_all_auctions(store: &StoreManager) -> Result<Vec<Auction>, StoreError> {
    info!("{:<12} --> 모든 경매 조회", "Query");
    store.read(|db| db.auctions.clone()).await
}

/// 입찰 이력 조회 (최신 순)
pub async fn get_bid_history(
    store: &StoreManager,
    auction_id: i64,
) -> Result<Vec<Bid>, StoreError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", auction_id);
    store
        .read(|db| {
            let mut bids: Vec<Bid> = db
                .bids
                .iter()
                .filter(|b| b.auction_id == auction_id)
                .cloned()
                .collect();
            bids.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            bids
        })
        .await
}

/// 경매별 채팅 조회 (저장 순서 = 시간 순). 0은 전체 채팅 몫이므로 제외한다.
pub async fn get_auction_chat(
    store: &StoreManager,
    auction_id: i64,
) -> Result<Vec<ChatMessage>, StoreError> {
    info!("{:<12} --> 경매 채팅 조회 id: {}", "Query", auction_id);
    store
        .read(|db| {
            db.chat_messages
                .iter()
                .filter(|m| auction_id != 0 && m.auction_id == Some(auction_id))
                .cloned()
                .collect()
        })
        .await
}

/// 전체(글로벌) 채팅 조회 (저장 순서 = 시간 순).
/// 키가 없는 메시지뿐 아니라 공유 파일에 0으로 저장된 메시지도 전체 채팅이다.
pub async fn get_global_chat(store: &StoreManager) -> Result<Vec<ChatMessage>, StoreError> {
    info!("{:<12} --> 전체 채팅 조회", "Query");
    store
        .read(|db| {
            db.chat_messages
                .iter()
                .filter(|m| matches!(m.auction_id, None | Some(0)))
                .cloned()
                .collect()
        })
        .await
}

// endregion: --- Query Handlers
