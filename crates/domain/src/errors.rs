//! 领域层错误定义

use thiserror::Error;

/// 持久化网关错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// 存储层错误
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl GatewayError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 媒体引擎错误
///
/// 任何发送失败或引擎侧错误都终止整个中继，无部分结果。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    /// 无法连接媒体引擎
    #[error("media engine unreachable: {0}")]
    Unavailable(String),

    /// 引擎拒绝或中断了本次上传
    #[error("media engine rejected upload: {0}")]
    Rejected(String),

    /// 引擎返回了空的存储地址
    #[error("media engine returned an empty file url")]
    EmptyFileUrl,
}
