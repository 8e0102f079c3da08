//! 消息实体
//!
//! 消息记录由持久化网关持有，id 由其单调递增分配。
//! 每条记录的 content 与 file_url 恰好有一个有效。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
}

/// 持久化网关返回的消息记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// 根据 file_url 是否存在推导消息类型
    pub fn kind(&self) -> MessageKind {
        if self.file_url.is_some() {
            MessageKind::Image
        } else {
            MessageKind::Text
        }
    }
}

/// 创建消息的请求
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub user_id: String,
    pub username: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
}

impl NewMessage {
    /// 文本消息
    pub fn text(identity: &Identity, content: impl Into<String>) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            content: Some(content.into()),
            file_url: None,
        }
    }

    /// 图片消息，仅携带媒体引擎返回的存储地址
    pub fn image(identity: &Identity, file_url: impl Into<String>) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            content: None,
            file_url: Some(file_url.into()),
        }
    }
}
