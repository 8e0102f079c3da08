//! 主应用程序入口
//!
//! 组装连接中枢、上传中继与 Web API 并启动服务。

use std::sync::Arc;
use std::time::Duration;

use application::{ChatService, Hub, UploadRelay};
use config::AppConfig;
use domain::{MediaEngine, MessageStore};
use infrastructure::{create_pool, GrpcMediaEngine, PgMessageStore};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取环境变量配置，缺省值仅用于开发环境
    let config = AppConfig::from_env_with_defaults();
    if let Err(err) = config.validate() {
        tracing::warn!(error = %err, "运行在非生产配置下");
    }

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').next_back().unwrap_or("unknown")
    );
    let pool = create_pool(&config.database.url, config.database.max_connections).await?;

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // 持久化网关与媒体引擎客户端
    let store: Arc<dyn MessageStore> = Arc::new(PgMessageStore::new(pool));
    let media: Arc<dyn MediaEngine> = Arc::new(GrpcMediaEngine::connect_lazy(&config.media.endpoint)?);
    tracing::info!("媒体引擎端点: {}", config.media.endpoint);

    // 连接中枢与应用层服务
    let hub = Hub::spawn();
    let chat_service = Arc::new(ChatService::new(
        store.clone(),
        hub.clone(),
        config.history.limit,
    ));
    let upload_relay = Arc::new(UploadRelay::new(
        media,
        store,
        hub.clone(),
        config.media.chunk_size,
        Duration::from_secs(config.media.upload_timeout_secs),
    ));

    // JWT 验证服务，token 由外部认证服务签发
    let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

    let state = AppState::new(
        chat_service,
        upload_relay,
        hub,
        jwt_service,
        config.media.max_upload_bytes,
    );

    // 启动 Web 服务器
    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("聊天服务器启动在 http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
