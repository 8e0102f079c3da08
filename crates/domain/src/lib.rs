//! 聊天中枢核心领域模型
//!
//! 包含消息实体、实时事件帧、以及对外部协作方
//! （持久化网关、媒体引擎）的窄接口定义。

pub mod errors;
pub mod events;
pub mod gateways;
pub mod identity;
pub mod media;
pub mod message;

pub use errors::{GatewayError, MediaError};
pub use events::{ClientEvent, Envelope, ServerEvent};
pub use gateways::{FrameStream, MediaEngine, MessageStore};
pub use identity::Identity;
pub use media::{FileMetadata, StoredFile, UploadFrame};
pub use message::{ChatMessage, MessageKind, NewMessage};

#[cfg(feature = "testing")]
pub use gateways::{MockMediaEngine, MockMessageStore};
