use auction_live::auction::events::AuctionEvent;
use auction_live::broadcast::{BroadcastHub, ViewerStream};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_stream::StreamExt;

/// 연결 확인 이벤트 테스트. 등록 직후 첫 이벤트는 항상 연결 확인이다.
#[tokio::test]
async fn first_event_is_connection_ack() {
    let hub = BroadcastHub::new();
    let (_, mut rx) = hub.register();

    let ack: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(ack["type"], "connection");
    assert_eq!(ack["message"], "Connected to auction server");
}

/// 기본값 생성 테스트. 빈 허브와 1부터 시작하는 연결 id를 갖는다.
#[tokio::test]
async fn default_hub_matches_new() {
    let hub = BroadcastHub::default();
    assert_eq!(hub.viewer_count(), 0);

    let (connection_id, _rx) = hub.register();
    assert_eq!(connection_id, 1);
    assert_eq!(hub.viewer_count(), 1);
}

/// 전파 테스트. 모든 뷰어가 같은 페이로드를 같은 순서로 받는다.
#[tokio::test]
async fn broadcast_reaches_every_viewer_in_order() {
    let hub = BroadcastHub::new();
    let (_, mut rx1) = hub.register();
    let (_, mut rx2) = hub.register();
    rx1.recv().await.unwrap();
    rx2.recv().await.unwrap();

    hub.broadcast(&bid_event(1, 11000));
    hub.broadcast(&timer_event(1, 30));

    let first_1 = rx1.recv().await.unwrap();
    let first_2 = rx2.recv().await.unwrap();
    assert_eq!(first_1, first_2); // 직렬화는 한 번, 페이로드는 동일

    let second_1: Value = serde_json::from_str(&rx1.recv().await.unwrap()).unwrap();
    let second_2: Value = serde_json::from_str(&rx2.recv().await.unwrap()).unwrap();
    assert_eq!(second_1["type"], "timer_update");
    assert_eq!(second_2["type"], "timer_update");

    let first: Value = serde_json::from_str(&first_1).unwrap();
    assert_eq!(first["type"], "bid_update");
    assert_eq!(first["auctionId"], 1);
    assert_eq!(first["currentBid"], 11000);
}

/// 늦게 등록한 뷰어 테스트. 등록 이전 이벤트는 받지 못한다.
#[tokio::test]
async fn late_viewer_misses_earlier_events() {
    let hub = BroadcastHub::new();
    let (_, mut rx1) = hub.register();
    rx1.recv().await.unwrap();

    hub.broadcast(&bid_event(1, 11000));

    let (_, mut rx2) = hub.register();
    rx2.recv().await.unwrap(); // 연결 확인
    hub.broadcast(&bid_event(1, 12000));

    // 먼저 온 뷰어는 두 이벤트를 모두 받는다
    let e1: Value = serde_json::from_str(&rx1.recv().await.unwrap()).unwrap();
    let e2: Value = serde_json::from_str(&rx1.recv().await.unwrap()).unwrap();
    assert_eq!(e1["currentBid"], 11000);
    assert_eq!(e2["currentBid"], 12000);

    // 늦게 온 뷰어는 등록 이후 이벤트만 받는다
    let only: Value = serde_json::from_str(&rx2.recv().await.unwrap()).unwrap();
    assert_eq!(only["currentBid"], 12000);
    assert!(rx2.try_recv().is_err());
}

/// 채널 제거 테스트. 죽은 채널은 다음 전파에서 빠지고 나머지는 계속 받는다.
#[tokio::test]
async fn dropped_viewer_is_pruned_without_blocking_others() {
    let hub = BroadcastHub::new();
    let (_, rx1) = hub.register();
    let (_, mut rx2) = hub.register();
    rx2.recv().await.unwrap();
    assert_eq!(hub.viewer_count(), 2);

    drop(rx1);
    hub.broadcast(&bid_event(1, 11000));

    // 살아 있는 뷰어는 정상 수신
    let event: Value = serde_json::from_str(&rx2.recv().await.unwrap()).unwrap();
    assert_eq!(event["type"], "bid_update");
    // 죽은 채널은 제거됐다
    assert_eq!(hub.viewer_count(), 1);
}

/// 등록 해제 테스트
#[tokio::test]
async fn unregister_removes_channel() {
    let hub = BroadcastHub::new();
    let (connection_id, _rx) = hub.register();
    assert_eq!(hub.viewer_count(), 1);

    hub.unregister(connection_id);
    assert_eq!(hub.viewer_count(), 0);

    // 같은 id를 다시 해제해도 아무 일도 없다
    hub.unregister(connection_id);
    assert_eq!(hub.viewer_count(), 0);
}

/// 동시 등록 테스트. 연결 id는 절대 겹치지 않는다.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_get_distinct_ids() {
    let hub = Arc::new(BroadcastHub::new());

    let mut handles = vec![];
    for _ in 0..20 {
        let hub = Arc::clone(&hub);
        handles.push(tokio::spawn(async move {
            let (connection_id, _rx) = hub.register();
            connection_id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }
    assert_eq!(ids.len(), 20);
    assert_eq!(hub.viewer_count(), 20);
}

/// 뷰어 스트림 테스트. 스트림이 버려지면 등록도 해제된다.
#[tokio::test]
async fn viewer_stream_unregisters_on_drop() {
    let hub = Arc::new(BroadcastHub::new());
    let mut stream = ViewerStream::new(Arc::clone(&hub));
    assert_eq!(hub.viewer_count(), 1);

    // 첫 이벤트는 연결 확인
    assert!(matches!(stream.next().await, Some(Ok(_))));

    drop(stream);
    assert_eq!(hub.viewer_count(), 0);

    // 뷰어가 없어도 전파는 그냥 지나간다
    hub.broadcast(&bid_event(1, 11000));
    assert_eq!(hub.viewer_count(), 0);
}

/// 테스트용 입찰 이벤트
fn bid_event(auction_id: i64, amount: i64) -> AuctionEvent {
    AuctionEvent::BidUpdate {
        auction_id,
        current_bid: amount,
        current_bidder: "입찰자1".to_string(),
        timestamp: Utc::now(),
    }
}

/// 테스트용 남은 시간 이벤트
fn timer_event(auction_id: i64, time_left: i64) -> AuctionEvent {
    AuctionEvent::TimerUpdate {
        auction_id,
        time_left,
    }
}
