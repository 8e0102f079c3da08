//! 集成测试支撑：内存持久化网关与媒体引擎替身，
//! 以及绑定随机端口的测试服务器。

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use application::{ChatService, Hub, UploadRelay};
use config::JwtConfig;
use domain::{
    ChatMessage, FrameStream, GatewayError, Identity, MediaEngine, MediaError, MessageStore,
    NewMessage, StoredFile,
};
use web_api::{router, AppState, JwtService};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 内存消息存储：id 从 1 开始严格递增
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<ChatMessage>>,
    next_id: AtomicI64,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create_message(&self, new_message: NewMessage) -> Result<ChatMessage, GatewayError> {
        let message = ChatMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: new_message.user_id,
            username: new_message.username,
            content: new_message.content,
            file_url: new_message.file_url,
            created_at: Utc::now(),
        };
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<ChatMessage>, GatewayError> {
        let messages = self.messages.lock().await;
        let skip = messages.len().saturating_sub(limit as usize);
        Ok(messages[skip..].to_vec())
    }
}

/// 媒体引擎替身：吞掉整个帧流后返回配置结果
pub struct StubMediaEngine {
    result: Result<StoredFile, MediaError>,
}

impl StubMediaEngine {
    pub fn ok(url: &str) -> Self {
        Self {
            result: Ok(StoredFile { url: url.into() }),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(MediaError::Unavailable("connection refused".into())),
        }
    }
}

#[async_trait]
impl MediaEngine for StubMediaEngine {
    async fn store(&self, mut frames: FrameStream) -> Result<StoredFile, MediaError> {
        while frames.next().await.is_some() {}
        self.result.clone()
    }
}

pub fn build_state(media: Arc<dyn MediaEngine>) -> AppState {
    let hub = Hub::spawn();
    let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::new());
    let jwt_service = Arc::new(JwtService::new(JwtConfig {
        secret: "integration-test-secret-with-32-chars!".into(),
        expiration_hours: 1,
    }));

    AppState::new(
        Arc::new(ChatService::new(store.clone(), hub.clone(), 100)),
        Arc::new(UploadRelay::new(
            media,
            store,
            hub.clone(),
            4096,
            Duration::from_secs(10),
        )),
        hub,
        jwt_service,
        MAX_UPLOAD_BYTES,
    )
}

/// 启动测试服务器，返回监听地址与共享状态
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

pub fn token_for(state: &AppState, user_id: &str, username: &str) -> String {
    state
        .jwt_service
        .generate_token(&Identity::new(user_id, username))
        .expect("token")
}
