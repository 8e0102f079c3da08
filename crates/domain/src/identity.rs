//! 请求身份
//!
//! 身份由外部认证服务签发，经 JWT 验证后以显式参数传递，
//! 下游不再重复校验。

use serde::{Deserialize, Serialize};

/// 一次已认证请求的调用者身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}
