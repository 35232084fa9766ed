/// 입찰 커맨드 처리.
/// 검증과 반영을 스토어 트랜잭션 하나로 끝낸 뒤 이벤트를 브로드캐스트한다.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::bidding::model::{AuctionStatus, Bid};
use crate::broadcast::BroadcastHub;
use crate::store::{StoreError, StoreManager};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령 (뷰어가 보내는 요청 본문, camelCase)
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder: String,
    pub amount: i64,
}

/// 입찰 처리 오류.
/// 거절(Rejected)은 클라이언트에게 그대로 내려보낼 JSON 본문을 담는다.
#[derive(Debug, Error)]
pub enum BidError {
    #[error("입찰 거절")]
    Rejected(serde_json::Value),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 입찰 처리.
/// 경매 존재 여부, 상태, 금액을 서버가 직접 검증하고, 통과한 경우에만
/// 현재가를 갱신하고 입찰 기록을 추가한다. 저장이 끝난 다음에 이벤트를
/// 내보내므로 이벤트를 받은 뷰어는 곧바로 스토어에서 일관된 상태를 읽을 수 있다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &StoreManager,
    hub: &BroadcastHub,
) -> Result<Bid, BidError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    // 빈 입찰자 식별자는 형식 오류로 거절
    if cmd.bidder.trim().is_empty() {
        return Err(BidError::Rejected(serde_json::json!({
            "error": "입찰자 정보가 비어 있습니다.",
            "code": "INVALID_BIDDER"
        })));
    }

    let now = Utc::now();
    let accepted = store
        .transaction(|db| {
            let bid_id = db.next_bid_id();
            let Some(auction) = db.auction_mut(cmd.auction_id) else {
                // 존재하지 않는 경매에는 입찰 기록도 남기지 않는다
                return (
                    Err(serde_json::json!({
                        "error": "경매를 찾을 수 없습니다.",
                        "code": "NOT_FOUND"
                    })),
                    false,
                );
            };

            // 경매 상태 검증 (저장된 상태 필드가 단일 기준이다)
            match auction.status {
                AuctionStatus::Upcoming => {
                    return (
                        Err(serde_json::json!({
                            "error": "경매가 아직 시작되지 않았습니다.",
                            "code": "NOT_STARTED"
                        })),
                        false,
                    )
                }
                AuctionStatus::Finished => {
                    return (
                        Err(serde_json::json!({
                            "error": "경매가 이미 종료되었습니다.",
                            "code": "ALREADY_ENDED"
                        })),
                        false,
                    )
                }
                AuctionStatus::Active => {}
            }

            // 입찰 금액 검증 (클라이언트를 믿지 않고 현재가와 직접 비교)
            if cmd.amount <= auction.current_bid {
                return (
                    Err(serde_json::json!({
                        "error": "입찰 금액이 현재 가격보다 낮습니다.",
                        "code": "LOW_BID",
                        "currentBid": auction.current_bid
                    })),
                    false,
                );
            }

            // 현재가 갱신
            auction.current_bid = cmd.amount;
            auction.current_bidder = Some(cmd.bidder.clone());

            // 입찰 기록 추가
            let bid = Bid {
                id: bid_id,
                auction_id: cmd.auction_id,
                bidder: cmd.bidder.clone(),
                amount: cmd.amount,
                timestamp: now,
            };
            db.bids.push(bid.clone());
            (Ok(bid), true)
        })
        .await?;
    let bid = accepted.map_err(BidError::Rejected)?;

    // 저장이 끝난 뒤에 이벤트 전파
    hub.broadcast(&AuctionEvent::BidUpdate {
        auction_id: bid.auction_id,
        current_bid: bid.amount,
        current_bidder: bid.bidder.clone(),
        timestamp: bid.timestamp,
    });

    info!(
        "{:<12} --> 입찰 성공: 경매 {} 현재가 {}",
        "Command", bid.auction_id, bid.amount
    );
    Ok(bid)
}

// endregion: --- Commands
