//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：连接中枢（注册/注销/广播的
//! 单所有者控制循环）、上传中继（multipart 到媒体引擎的流式代理）、
//! 以及文本消息与历史记录的用例。

pub mod chat;
pub mod errors;
pub mod hub;
pub mod relay;

pub use chat::ChatService;
pub use errors::{ApplicationError, ApplicationResult};
pub use hub::{Connection, ConnectionId, Hub, HubHandle};
pub use relay::{chunk_frames, UploadOutcome, UploadRelay, UploadRequest};
