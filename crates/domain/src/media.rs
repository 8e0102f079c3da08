//! 媒体引擎流式上传协议类型
//!
//! 协议要求：恰好一个元数据帧在前，随后零个或多个数据块帧；
//! 发送端关闭后等待一个聚合响应。

use bytes::Bytes;

/// 上传文件的元数据，必须作为第一帧发送
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub file_name: String,
    pub content_type: String,
    pub uploader_id: String,
}

/// 流式上传的一帧
#[derive(Debug, Clone, PartialEq)]
pub enum UploadFrame {
    Metadata(FileMetadata),
    Chunk(Bytes),
}

/// 媒体引擎的聚合响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub url: String,
}
