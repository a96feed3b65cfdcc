use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("员工未找到: {id}")]
    EmployeeNotFound { id: i64 },
    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },
    #[error("不支持的过滤字段: {fields}，可用字段: {allowed}")]
    InvalidFilter { fields: String, allowed: String },
    #[error("数据验证失败: {0}")]
    ValidationError(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn employee_not_found(id: i64) -> Self {
        Self::EmployeeNotFound { id }
    }
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }
    pub fn invalid_filter<S: Into<String>>(fields: S, allowed: S) -> Self {
        Self::InvalidFilter {
            fields: fields.into(),
            allowed: allowed.into(),
        }
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TrackerError::EmployeeNotFound { .. } | TrackerError::TaskNotFound { .. }
        )
    }
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TrackerError::EmployeeNotFound { .. }
                | TrackerError::TaskNotFound { .. }
                | TrackerError::InvalidFilter { .. }
                | TrackerError::ValidationError(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            TrackerError::EmployeeNotFound { .. } => "请求的员工不存在",
            TrackerError::TaskNotFound { .. } => "请求的任务不存在",
            TrackerError::InvalidFilter { .. } => "请求包含不支持的过滤字段",
            TrackerError::ValidationError(_) => "输入数据验证失败",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        TrackerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests;
