// region:    --- Imports
use crate::bidding::model::{Auction, Bid};
use crate::chat::model::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

// endregion: --- Imports

// region:    --- Snapshot

/// 레코드 스토어가 다루는 문서 전체.
/// 부분 갱신 API는 없고 항상 전체를 읽고(read_all) 전체를 다시 쓴다(write_all).
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub auctions: Vec<Auction>,
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessage>,
    // 외부 CRUD 계층이 같은 파일에 두는 컬렉션(users 등)은 그대로 보존한다
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Snapshot {
    /// 다음 입찰 id (기존 최대값 + 1)
    pub fn next_bid_id(&self) -> i64 {
        self.bids.iter().map(|b| b.id).max().unwrap_or(0) + 1
    }

    /// 다음 채팅 메시지 id (기존 최대값 + 1)
    pub fn next_message_id(&self) -> i64 {
        self.chat_messages.iter().map(|m| m.id).max().unwrap_or(0) + 1
    }

    /// id로 경매 찾기 (수정용)
    pub fn auction_mut(&mut self, auction_id: i64) -> Option<&mut Auction> {
        self.auctions.iter_mut().find(|a| a.id == auction_id)
    }
}

// endregion: --- Snapshot

// region:    --- Store Error

/// 스토어 입출력 오류
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("스토어 파일 입출력 실패: {0}")]
    Io(#[from] std::io::Error),
    #[error("스토어 문서 파싱 실패: {0}")]
    Serde(#[from] serde_json::Error),
}

// endregion: --- Store Error

// region:    --- Record Store

/// 레코드 스토어 트레이트 (외부 협력자 계약: 전체 읽기 / 전체 쓰기)
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read_all(&self) -> Result<Snapshot, StoreError>;
    async fn write_all(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// JSON 파일 기반 레코드 스토어 구현체
pub struct JsonFileStore {
    path: PathBuf,
}

/// JSON 파일 스토어 생성
impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// JSON 파일 스토어 메서드 구현
#[async_trait]
impl RecordStore for JsonFileStore {
    async fn read_all(&self) -> Result<Snapshot, StoreError> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_all(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        // 외부 CRUD 계층도 같은 파일을 읽으므로 원본과 같은 들여쓰기 JSON으로 기록
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

// endregion: --- Record Store

// region:    --- Store Manager

/// 스토어 매니저.
/// 모든 읽기/쓰기를 잠금 하나 뒤로 직렬화해서 틱과 입찰/채팅 처리가
/// 읽기-수정-쓰기 사이에 끼어들어 서로의 갱신을 덮어쓰지 못하게 한다.
pub struct StoreManager {
    store: Box<dyn RecordStore>,
    lock: Mutex<()>,
}

impl StoreManager {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            lock: Mutex::new(()),
        }
    }

    /// 스토어 초기화. 파일이 아직 없으면 빈 문서를 만들어 둔다.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        match self.store.read_all().await {
            Ok(_) => Ok(()),
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!("{:<12} --> 스토어 파일이 없어 빈 문서를 생성", "Store");
                self.store.write_all(&Snapshot::default()).await
            }
            Err(e) => Err(e),
        }
    }

    /// 스냅샷 읽기
    pub async fn read<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&Snapshot) -> R,
    {
        let _guard = self.lock.lock().await;
        let snapshot = self.store.read_all().await?;
        Ok(f(&snapshot))
    }

    /// 트랜잭션 실행 (전체 읽기 - 수정 - 전체 쓰기).
    /// 클로저는 (결과, 변경 여부)를 반환하고 변경된 경우에만 다시 기록한다.
    pub async fn transaction<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Snapshot) -> (R, bool),
    {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.store.read_all().await?;
        let (result, changed) = f(&mut snapshot);
        if changed {
            self.store.write_all(&snapshot).await?;
        }
        Ok(result)
    }
}

// endregion: --- Store Manager
