//! 上传中继
//!
//! 接收 HTTP multipart 文件后打开一次对媒体引擎的流式调用：
//! 元数据帧必须先于任何数据帧发送，文件按固定大小切块、按序
//! 逐块发送，最后一个不足一块的尾块同样发送。关闭发送侧并等待
//! 聚合响应；整个中继受统一超时约束，超时即取消，最多一次、
//! 不重试、无可续传状态。
//!
//! 拿到非空存储地址之前绝不调用持久化；持久化成功之前绝不广播。

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use domain::{
    Envelope, FileMetadata, FrameStream, Identity, MediaEngine, MediaError, MessageStore,
    NewMessage, ServerEvent, UploadFrame,
};
use tracing::{info, warn};

use crate::errors::{ApplicationError, ApplicationResult};
use crate::hub::HubHandle;

/// 一次上传请求（multipart 解析后的产物）
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// 中继成功的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub message_id: i64,
    pub url: String,
}

/// 把一次上传编排为协议要求的帧序列
///
/// 恰好一个元数据帧在前；随后每个非空数据块一帧、按序排列；
/// 长度不足 chunk_size 的尾块不丢弃。空文件只产生元数据帧。
pub fn chunk_frames(metadata: FileMetadata, data: Bytes, chunk_size: usize) -> Vec<UploadFrame> {
    let mut frames = Vec::with_capacity(1 + data.len().div_ceil(chunk_size));
    frames.push(UploadFrame::Metadata(metadata));

    let mut rest = data;
    while !rest.is_empty() {
        let take = rest.len().min(chunk_size);
        frames.push(UploadFrame::Chunk(rest.split_to(take)));
    }
    frames
}

/// HTTP 上传到媒体引擎流式调用的代理
pub struct UploadRelay {
    media: Arc<dyn MediaEngine>,
    store: Arc<dyn MessageStore>,
    hub: HubHandle,
    chunk_size: usize,
    timeout: Duration,
}

impl UploadRelay {
    pub fn new(
        media: Arc<dyn MediaEngine>,
        store: Arc<dyn MessageStore>,
        hub: HubHandle,
        chunk_size: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            media,
            store,
            hub,
            chunk_size,
            timeout,
        }
    }

    /// 执行一次中继
    ///
    /// 任何发送失败、超时或引擎侧错误都使本次中继整体失败，
    /// 不持久化、不广播。媒体引擎成功而持久化失败时，文件已经
    /// 落盘但消息丢失，这是文档化的不一致，调用方收到错误。
    pub async fn relay(
        &self,
        identity: &Identity,
        upload: UploadRequest,
    ) -> ApplicationResult<UploadOutcome> {
        let size = upload.data.len();
        let metadata = FileMetadata {
            file_name: upload.file_name,
            content_type: upload.content_type,
            uploader_id: identity.user_id.clone(),
        };

        let frames = chunk_frames(metadata, upload.data, self.chunk_size);
        let stream: FrameStream = Box::pin(futures_util::stream::iter(frames));

        let stored = match tokio::time::timeout(self.timeout, self.media.store(stream)).await {
            Ok(Ok(stored)) => stored,
            Ok(Err(err)) => {
                warn!(error = %err, "media engine refused the upload stream");
                return Err(ApplicationError::Upstream(err));
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "upload relay timed out, streaming call cancelled");
                return Err(ApplicationError::UploadTimeout(self.timeout));
            }
        };

        if stored.url.is_empty() {
            return Err(ApplicationError::Upstream(MediaError::EmptyFileUrl));
        }

        let message = self
            .store
            .create_message(NewMessage::image(identity, &stored.url))
            .await?;
        info!(message_id = message.id, size, url = %stored.url, "upload stored and persisted");

        let envelope = Envelope::serialize(&ServerEvent::from_message(&message))?;
        self.hub.broadcast(envelope);

        Ok(UploadOutcome {
            message_id: message.id,
            url: stored.url,
        })
    }
}
