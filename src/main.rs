// region:    --- Imports
use crate::broadcast::BroadcastHub;
use crate::store::{JsonFileStore, StoreManager};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auction;
mod bidding;
mod broadcast;
mod chat;
mod handlers;
mod scheduler;
mod store;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 레코드 스토어 생성 (JSON 파일 하나가 전체 데이터베이스다)
    let db_path = std::env::var("AUCTION_DB_PATH").unwrap_or_else(|_| "db.json".to_string());
    let store = Arc::new(StoreManager::new(JsonFileStore::new(&db_path)));

    // 스토어 초기화 (파일이 없으면 빈 스토어를 만든다)
    if let Err(e) = store.initialize().await {
        error!("{:<12} --> 스토어 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    let auction_count = store.read(|db| db.auctions.len()).await?;
    info!(
        "{:<12} --> 스토어 초기화 성공: {} (경매 {}건)",
        "Main", db_path, auction_count
    );

    // 브로드캐스트 허브 생성
    let hub = Arc::new(BroadcastHub::new());

    // 경매 상태 전이를 담당하는 시계
    let scheduler = scheduler::AuctionScheduler::new(Arc::clone(&store), Arc::clone(&hub));
    let scheduler_handle = scheduler.start().await;

    // 프론트엔드 데모 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = handlers::routes(Arc::clone(&store), Arc::clone(&hub)).layer(cors);

    // 리스너 생성(기본 3002번 포트)
    let port = std::env::var("PORT").unwrap_or_else(|_| "3002".to_string());
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await.unwrap();
    info!(
        "{:<12} --> SSE Server: Listening on {}",
        "Main",
        listener.local_addr().unwrap()
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    // 서버가 내려간 뒤 스케줄러도 함께 정리
    scheduler_handle.shutdown().await;
    Ok(())
}

/// Ctrl-C를 받으면 서버를 내린다
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{:<12} --> 종료 신호 대기 실패: {:?}", "Main", e);
    }
}
// endregion: --- Main
