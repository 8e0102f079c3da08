//! 基础设施层
//!
//! 外部协作方接口的具体实现：PostgreSQL 持久化网关与
//! gRPC 媒体引擎客户端。

pub mod db;
pub mod media;

pub use db::{create_pool, DbPool, PgMessageStore};
pub use media::GrpcMediaEngine;
