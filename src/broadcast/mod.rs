// region:    --- Imports
use crate::auction::events::AuctionEvent;
use axum::response::sse::Event as SseEvent;
use std::collections::HashMap;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Broadcast Hub

// 접속 직후 보내는 연결 확인 메시지
const CONNECTED_MESSAGE: &str = "Connected to auction server";

/// 브로드캐스트 허브.
/// 접속 중인 뷰어 채널을 보관하고 이벤트 하나를 모든 채널에 전달한다.
/// 전달 보장은 없다. 등록 이후에 발생한 이벤트만 받는다.
pub struct BroadcastHub {
    // 채널에는 미리 직렬화한 페이로드를 보낸다 (이벤트당 직렬화는 한 번)
    clients: Mutex<HashMap<u64, mpsc::UnboundedSender<String>>>,
    // 밀리초 시각 대신 원자 카운터를 쓰므로 동시 접속에도 id 충돌이 없다
    next_connection_id: AtomicU64,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// 뷰어 채널 등록. 연결 확인 이벤트를 먼저 채널에 넣은 뒤 보관한다.
    pub fn register(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        // 연결 확인 이벤트
        let ack = AuctionEvent::Connection {
            message: CONNECTED_MESSAGE.to_string(),
        };
        if let Ok(payload) = serde_json::to_string(&ack) {
            let _ = tx.send(payload);
        }

        self.clients.lock().unwrap().insert(connection_id, tx);
        info!("{:<12} --> 뷰어 연결: {}", "Broadcast", connection_id);
        (connection_id, rx)
    }

    /// 뷰어 채널 제거. 전송 계층의 연결 종료 알림에서 호출된다.
    pub fn unregister(&self, connection_id: u64) {
        if self.clients.lock().unwrap().remove(&connection_id).is_some() {
            info!("{:<12} --> 뷰어 연결 해제: {}", "Broadcast", connection_id);
        }
    }

    /// 이벤트를 모든 뷰어 채널에 전달.
    /// 한 번만 직렬화하고, 전송에 실패한 채널은 로그만 남기고 제거한다.
    /// 실패가 다른 채널 전달이나 호출자에게 번지지 않는다.
    pub fn broadcast(&self, event: &AuctionEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("{:<12} --> 이벤트 직렬화 실패: {:?}", "Broadcast", e);
                return;
            }
        };

        let mut clients = self.clients.lock().unwrap();
        clients.retain(|connection_id, tx| match tx.send(payload.clone()) {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    "{:<12} --> 뷰어 {} 전송 실패, 채널 제거",
                    "Broadcast", connection_id
                );
                false
            }
        });
    }

    /// 현재 접속 중인 뷰어 수
    pub fn viewer_count(&self) -> usize {
        self.clients.lock().unwrap().len()
    }
}

// endregion: --- Broadcast Hub

// region:    --- Viewer Stream

/// 허브 채널을 SSE 응답 스트림으로 바꿔 주는 어댑터.
/// axum이 응답 스트림을 드롭하는 순간(클라이언트 연결 종료)이 곧
/// 전송 계층의 종료 알림이므로 Drop에서 등록을 해제한다.
pub struct ViewerStream {
    connection_id: u64,
    hub: Arc<BroadcastHub>,
    inner: UnboundedReceiverStream<String>,
}

impl ViewerStream {
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        let (connection_id, rx) = hub.register();
        Self {
            connection_id,
            hub,
            inner: UnboundedReceiverStream::new(rx),
        }
    }

    /// 이 스트림의 연결 id
    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }
}

impl Stream for ViewerStream {
    type Item = Result<SseEvent, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(payload)) => {
                Poll::Ready(Some(Ok(SseEvent::default().data(payload))))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ViewerStream {
    fn drop(&mut self) {
        self.hub.unregister(self.connection_id);
    }
}

// endregion: --- Viewer Stream
