//! 应用层错误定义

use std::time::Duration;

use domain::{GatewayError, MediaError};
use thiserror::Error;

/// 应用层错误类型
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求本身不合法（缺少字段、无法解析等）
    #[error("validation failed: {0}")]
    Validation(String),

    /// 媒体引擎不可达、拒绝或中断了流式调用
    #[error("media engine error: {0}")]
    Upstream(#[from] MediaError),

    /// 上传中继整体超时，流式调用已被取消
    #[error("upload relay timed out after {0:?}")]
    UploadTimeout(Duration),

    /// 持久化网关写入或读取失败
    #[error("persistence gateway error: {0}")]
    Persistence(#[from] GatewayError),

    /// 广播信封序列化失败
    #[error("broadcast payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 应用层结果类型
pub type ApplicationResult<T> = Result<T, ApplicationError>;
