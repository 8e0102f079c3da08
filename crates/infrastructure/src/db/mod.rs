//! 数据库基础设施
//!
//! 连接池创建带就绪等待：容器编排下数据库可能晚于本服务启动。

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::{info, warn};

mod message_store;

pub use message_store::PgMessageStore;

pub type DbPool = Pool<Postgres>;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// 创建连接池，数据库未就绪时按固定间隔重试
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let mut last_err = None;
    for attempt in 1..=CONNECT_ATTEMPTS {
        match PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "connected to PostgreSQL");
                return Ok(pool);
            }
            Err(err) => {
                warn!(attempt, error = %err, "database not ready yet, retrying");
                last_err = Some(err);
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
    Err(last_err.expect("at least one connect attempt was made"))
}
