//! 外部协作方接口
//!
//! 核心只消费这些窄接口：持久化网关负责消息记录，
//! 媒体引擎负责二进制存储。具体实现位于 infrastructure。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::errors::{GatewayError, MediaError};
use crate::media::{StoredFile, UploadFrame};
use crate::message::{ChatMessage, NewMessage};

/// 上传帧流
pub type FrameStream = Pin<Box<dyn Stream<Item = UploadFrame> + Send>>;

/// 持久化网关
///
/// `create_message` 由网关分配严格递增的消息 id；
/// `recent_messages` 返回最近 limit 条记录，按时间从旧到新。
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_message(&self, new_message: NewMessage) -> Result<ChatMessage, GatewayError>;

    async fn recent_messages(&self, limit: i64) -> Result<Vec<ChatMessage>, GatewayError>;
}

/// 媒体引擎
///
/// 一次流式调用：一个元数据帧在前，随后按序的数据块帧，
/// 关闭发送侧后返回一个聚合响应。失败即整体失败，无部分结果。
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MediaEngine: Send + Sync {
    async fn store(&self, frames: FrameStream) -> Result<StoredFile, MediaError>;
}
