/// 경매 시계.
/// 1초마다 스토어를 훑어 upcoming -> active -> finished 전이를 반영하고,
/// 전이 이벤트와 남은 시간 이벤트를 허브로 내보낸다.
/// 상태 전이는 이 스케줄러만 수행한다. 입찰 처리 쪽은 상태를 읽기만 한다.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::bidding::model::AuctionStatus;
use crate::broadcast::BroadcastHub;
use crate::store::{StoreError, StoreManager};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Auction Scheduler
/// 경매 상태 업데이트 스케줄러
pub struct AuctionScheduler {
    store: Arc<StoreManager>,
    hub: Arc<BroadcastHub>,
}

/// 스케줄러 태스크 핸들.
/// 종료 신호를 보내고 태스크가 끝날 때까지 기다릴 수 있다.
pub struct SchedulerHandle {
    shutdown: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// 틱 루프를 멈추고 태스크가 내려갈 때까지 기다린다.
    /// 진행 중인 틱은 끝까지 처리된다.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
        info!("{:<12} --> 스케줄러가 종료되었습니다.", "Scheduler");
    }
}

impl AuctionScheduler {
    pub fn new(store: Arc<StoreManager>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// 경매 상태 업데이트 스케줄러 시작
    pub async fn start(&self) -> SchedulerHandle {
        let store = Arc::clone(&self.store);
        let hub = Arc::clone(&self.hub);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        let task = tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1)); // 1초마다 실행
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) =
                            Self::update_auction_statuses(&store, &hub, Utc::now()).await
                        {
                            error!(
                                "{:<12} --> 경매 상태 업데이트 중 오류 발생: {:?}",
                                "Scheduler", e
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });
        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// 경매 상태 업데이트 (틱 한 번).
    /// 전이는 한 트랜잭션으로 묶고, 저장이 끝난 뒤에만 이벤트를 내보낸다.
    /// 같은 틱에서 upcoming -> active -> finished 두 번 전이될 수도 있으므로
    /// 조건을 else 없이 순서대로 검사한다.
    /// 종료 판정은 내림한 남은 시간이 0인지로 한다. 종료 시각 자체와의
    /// 비교가 아니므로 진행 중 경매의 남은 시간이 0으로 방송되는 일은 없다.
    pub async fn update_auction_statuses(
        store: &StoreManager,
        hub: &BroadcastHub,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let events = store
            .transaction(|db| {
                let mut events = Vec::new();
                let mut changed = false;

                for auction in db.auctions.iter_mut() {
                    // upcoming -> active
                    if auction.status == AuctionStatus::Upcoming && now >= auction.start_time {
                        auction.status = AuctionStatus::Active;
                        changed = true;
                        events.push(AuctionEvent::AuctionStarted {
                            auction_id: auction.id,
                            title: auction.title.clone(),
                        });
                    }

                    // active -> finished, 아직이면 남은 시간 방송
                    if auction.status == AuctionStatus::Active {
                        // 종료 시각을 표현할 수 없는 경매는 전이 대상에서 빠진다
                        let Some(end_time) = auction.end_time() else {
                            continue;
                        };
                        // 남은 시간은 초 단위 내림. 틱이 초 경계와 어긋나 있어도
                        // 1초 미만이 남은 순간 이미 0이므로 그 틱에서 끝난다
                        let time_left = (end_time - now).num_seconds().max(0);
                        if time_left == 0 {
                            auction.status = AuctionStatus::Finished;
                            changed = true;
                            events.push(AuctionEvent::AuctionEnded {
                                auction_id: auction.id,
                                winner: auction.current_bidder.clone(),
                                final_bid: auction.current_bid,
                                title: auction.title.clone(),
                            });
                        } else if time_left % 5 == 0 || time_left <= 10 {
                            // 매 5초 경계와 마지막 10초 동안만 내보낸다
                            events.push(AuctionEvent::TimerUpdate {
                                auction_id: auction.id,
                                time_left,
                            });
                        }
                    }
                }

                (events, changed)
            })
            .await?;

        for event in &events {
            hub.broadcast(event);
        }

        debug!(
            "{:<12} --> 경매 상태가 성공적으로 업데이트되었습니다.",
            "Scheduler"
        );

        Ok(())
    }
}
// endregion: --- Auction Scheduler
