//! Web API 层。
//!
//! 提供 Axum 路由，把 HTTP / WebSocket 请求委托给应用层：
//! 实时通道交给连接中枢，上传交给上传中继。

mod auth;
mod error;
mod routes;
mod state;
mod websocket;

pub use auth::{AuthenticatedUser, Claims, JwtService};
pub use config::JwtConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
