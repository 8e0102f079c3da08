//! 文本消息与历史记录用例
//!
//! 入站文本事件走先持久化、后广播的路径；历史查询返回最近
//! N 条记录，按时间从旧到新，形状与实时出站帧一致。

use std::sync::Arc;

use domain::{ChatMessage, Envelope, Identity, MessageStore, NewMessage, ServerEvent};
use tracing::info;

use crate::errors::ApplicationResult;
use crate::hub::HubHandle;

pub struct ChatService {
    store: Arc<dyn MessageStore>,
    hub: HubHandle,
    history_limit: i64,
}

impl ChatService {
    pub fn new(store: Arc<dyn MessageStore>, hub: HubHandle, history_limit: i64) -> Self {
        Self {
            store,
            hub,
            history_limit,
        }
    }

    /// 处理一条已解码的文本事件：先落盘，成功后才广播
    ///
    /// 广播的信封只反映网关已分配 id 的记录。
    pub async fn post_text(
        &self,
        identity: &Identity,
        content: String,
    ) -> ApplicationResult<ChatMessage> {
        let message = self
            .store
            .create_message(NewMessage::text(identity, content))
            .await?;
        info!(message_id = message.id, user_id = %message.user_id, "text message persisted");

        let envelope = Envelope::serialize(&ServerEvent::from_message(&message))?;
        self.hub.broadcast(envelope);
        Ok(message)
    }

    /// 最近的历史消息，从旧到新
    pub async fn recent_messages(&self) -> ApplicationResult<Vec<ServerEvent>> {
        let messages = self.store.recent_messages(self.history_limit).await?;
        Ok(messages.iter().map(ServerEvent::from_message).collect())
    }
}
