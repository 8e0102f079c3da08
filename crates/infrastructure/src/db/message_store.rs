//! 消息持久化网关的 PostgreSQL 实现
//!
//! id 由 BIGSERIAL 分配，严格递增。username 在写入时落盘：
//! 身份归外部认证服务所有，历史查询不跨服务连表。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{ChatMessage, GatewayError, MessageStore, NewMessage};
use sqlx::FromRow;

use super::DbPool;

/// 数据库消息模型
#[derive(Debug, Clone, FromRow)]
struct DbMessage {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbMessage> for ChatMessage {
    fn from(row: DbMessage) -> Self {
        ChatMessage {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            content: row.content,
            file_url: row.file_url,
            created_at: row.created_at,
        }
    }
}

/// 消息持久化网关实现
pub struct PgMessageStore {
    pool: DbPool,
}

impl PgMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create_message(&self, new_message: NewMessage) -> Result<ChatMessage, GatewayError> {
        let row = sqlx::query_as::<_, DbMessage>(
            r#"INSERT INTO messages (user_id, username, content, file_url)
               VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, username, content, file_url, created_at"#,
        )
        .bind(&new_message.user_id)
        .bind(&new_message.username)
        .bind(&new_message.content)
        .bind(&new_message.file_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| GatewayError::storage(err.to_string()))?;

        Ok(row.into())
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<ChatMessage>, GatewayError> {
        // 取最近 limit 条，再翻转为从旧到新
        let rows = sqlx::query_as::<_, DbMessage>(
            r#"SELECT id, user_id, username, content, file_url, created_at
               FROM messages
               ORDER BY id DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| GatewayError::storage(err.to_string()))?;

        Ok(rows.into_iter().rev().map(ChatMessage::from).collect())
    }
}
