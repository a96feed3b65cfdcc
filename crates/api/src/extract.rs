//! 请求体提取器
//!
//! 包装 axum 自带的 JSON 提取器，让请求体解析失败（格式错误、
//! 字段类型不符）也走统一的错误信封，而不是默认的纯文本响应。

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::ApiError;

/// 解析失败时返回 [`ApiError`] 信封的 JSON 提取器
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::RequestBody(rejection)),
        }
    }
}
