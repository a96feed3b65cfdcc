use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracker_errors::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("跟踪器错误: {0}")]
    Tracker(#[from] TrackerError),

    #[error("验证错误: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("请求体解析错误: {0}")]
    RequestBody(#[from] axum::extract::rejection::JsonRejection),

    #[error("认证错误: {0}")]
    Authentication(#[from] crate::auth::AuthError),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Tracker(TrackerError::EmployeeNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("员工 ID {} 不存在", id),
                "EMPLOYEE_NOT_FOUND".to_string(),
                vec![
                    "请检查员工ID是否正确".to_string(),
                    "使用 GET /api/employees 查看所有员工".to_string(),
                ],
            ),
            ApiError::Tracker(TrackerError::TaskNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("任务 ID {} 不存在", id),
                "TASK_NOT_FOUND".to_string(),
                vec![
                    "请检查任务ID是否正确".to_string(),
                    "使用 GET /api/tasks 查看所有任务".to_string(),
                ],
            ),
            ApiError::Tracker(error @ TrackerError::InvalidFilter { .. }) => (
                StatusCode::BAD_REQUEST,
                error.to_string(),
                "INVALID_FILTER".to_string(),
                vec!["请移除不支持的查询参数后重试".to_string()],
            ),
            ApiError::Tracker(TrackerError::ValidationError(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数验证失败: {}", msg),
                "VALIDATION_ERROR".to_string(),
                vec!["请检查请求参数是否符合要求".to_string()],
            ),
            ApiError::Validation(errors) => {
                let error_details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .unwrap_or(&std::borrow::Cow::Borrowed("验证失败"))
                                    .to_string()
                            })
                            .collect();
                        format!("{}: {}", field, messages.join(", "))
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    format!("请求参数验证失败: {}", error_details.join("; ")),
                    "VALIDATION_ERROR".to_string(),
                    vec!["请检查请求参数是否符合要求".to_string()],
                )
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST".to_string(),
                vec!["请检查请求格式和参数".to_string()],
            ),
            ApiError::Authentication(auth_error) => {
                let suggestions = match auth_error {
                    crate::auth::AuthError::MissingApiKey => vec![format!(
                        "请在请求头中添加 {}: <key>",
                        crate::auth::API_KEY_HEADER
                    )],
                    crate::auth::AuthError::InvalidApiKey => {
                        vec!["请检查API密钥是否正确".to_string()]
                    }
                };
                (
                    StatusCode::UNAUTHORIZED,
                    auth_error.to_string(),
                    "AUTHENTICATION_ERROR".to_string(),
                    suggestions,
                )
            }
            ApiError::RequestBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "请求数据格式错误".to_string(),
                "SERIALIZATION_ERROR".to_string(),
                vec![
                    "请检查JSON格式是否正确".to_string(),
                    format!("详细错误: {}", rejection.body_text()),
                ],
            ),
            ApiError::Serialization(err) => (
                StatusCode::BAD_REQUEST,
                "请求数据格式错误".to_string(),
                "SERIALIZATION_ERROR".to_string(),
                vec![
                    "请检查JSON格式是否正确".to_string(),
                    format!("详细错误: {}", err),
                ],
            ),
            ApiError::Tracker(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_not_found_maps_to_404() {
        let error = ApiError::Tracker(TrackerError::employee_not_found(123));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_task_not_found_maps_to_404() {
        let error = ApiError::Tracker(TrackerError::task_not_found(7));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_filter_maps_to_400() {
        let error = ApiError::Tracker(TrackerError::invalid_filter("color", "position, department"));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_error_maps_to_500() {
        let error = ApiError::Tracker(TrackerError::database_error("connection lost"));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("last_name", validator::ValidationError::new("invalid"));

        let error: ApiError = errors.into();
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_error_maps_to_401() {
        let error = ApiError::Authentication(crate::auth::AuthError::MissingApiKey);
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
