//! 实时通道事件帧
//!
//! 入站帧由每连接读取任务解码，出站帧序列化后作为广播信封
//! 原样分发给所有注册连接。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, MessageKind};

/// 客户端入站事件
///
/// 仅识别 `{"type":"NEW_TEXT","content":...}`，其余形状一律忽略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "NEW_TEXT")]
    NewText { content: String },
}

impl ClientEvent {
    /// 宽容解码：无法识别的帧返回 None，不产生错误
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// 服务端出站事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "NEW_TEXT")]
    NewText {
        message_id: i64,
        user_id: String,
        username: String,
        content: String,
    },
    #[serde(rename = "NEW_IMAGE")]
    NewImage {
        message_id: i64,
        user_id: String,
        username: String,
        url: String,
    },
}

impl ServerEvent {
    /// 由持久化网关已落盘的记录构造出站事件
    ///
    /// 先持久化、后广播是全局不变式；因此这里只接受带有已分配
    /// id 的完整记录。
    pub fn from_message(message: &ChatMessage) -> Self {
        match message.kind() {
            MessageKind::Image => ServerEvent::NewImage {
                message_id: message.id,
                user_id: message.user_id.clone(),
                username: message.username.clone(),
                url: message.file_url.clone().unwrap_or_default(),
            },
            MessageKind::Text => ServerEvent::NewText {
                message_id: message.id,
                user_id: message.user_id.clone(),
                username: message.username.clone(),
                content: message.content.clone().unwrap_or_default(),
            },
        }
    }
}

/// 广播信封：已序列化的出站负载
///
/// 构造后不可变，逐字节分发给每个连接。
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Arc<str>);

impl Envelope {
    pub fn serialize(event: &ServerEvent) -> Result<Self, serde_json::Error> {
        serde_json::to_string(event).map(|json| Self(json.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
