//! JWT 认证关卡
//!
//! token 由外部认证服务签发，这里只做验证与身份提取。
//! 实时通道无法携带自定义 header，因此允许 `token` 查询参数
//! 作为 Bearer header 的回退。提取出的身份以类型化的值显式
//! 传入下游，缺失或无效一律以 401 拒绝。

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use config::JwtConfig;
use domain::Identity;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT Claims 结构，必须与认证服务签发的载荷一致
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub exp: i64,
}

/// JWT Token 服务
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 生成 JWT token（供测试与工具使用，签发方是外部认证服务）
    pub fn generate_token(&self, identity: &Identity) -> Result<String, ApiError> {
        let exp = chrono::Utc::now() + chrono::Duration::hours(self.config.expiration_hours);
        let claims = Claims {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| ApiError::unauthorized(format!("Token generation failed: {}", err)))
    }

    /// 验证并解析 JWT token
    pub fn verify_token(&self, token: &str) -> Result<Identity, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| Identity::new(data.claims.user_id, data.claims.username))
            .map_err(|err| ApiError::unauthorized(format!("Invalid token: {}", err)))
    }

    /// 从请求中提取并验证身份：优先 Bearer header，回退 token 查询参数
    pub fn extract_identity(&self, parts: &Parts) -> Result<Identity, ApiError> {
        let token = bearer_token(parts)
            .or_else(|| query_token(parts))
            .ok_or_else(|| ApiError::unauthorized("Missing token"))?;

        self.verify_token(&token)
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

fn query_token(parts: &Parts) -> Option<String> {
    parts
        .uri
        .query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// 已认证的调用者身份，作为 extractor 显式进入每个受保护的 handler
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .jwt_service
            .extract_identity(parts)
            .map(AuthenticatedUser)
    }
}
