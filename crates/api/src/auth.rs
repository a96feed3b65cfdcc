//! API密钥认证。配置中保存密钥的SHA-256摘要，请求携带明文密钥，
//! 服务端仅比对摘要。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::warn;

use crate::error::ApiError;
use crate::routes::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub enabled: bool,
    /// 合法密钥的十六进制SHA-256摘要
    pub key_digests: HashSet<String>,
}

impl AuthConfig {
    pub fn digest(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex_encode(&hasher.finalize())
    }

    pub fn verify(&self, key: &str) -> bool {
        self.key_digests.contains(&Self::digest(key))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("缺少API密钥")]
    MissingApiKey,
    #[error("API密钥无效")]
    InvalidApiKey,
}

/// 认证中间件。未启用认证时直接放行，健康检查始终放行。
pub async fn api_key_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth.enabled || request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingApiKey)?;

    if !state.auth.verify(key) {
        warn!("拒绝无效API密钥的请求: {}", request.uri().path());
        return Err(AuthError::InvalidApiKey.into());
    }

    Ok(next.run(request).await)
}
