use crate::*;

#[test]
fn test_tracker_error_display() {
    let db_op_error = TrackerError::DatabaseOperation("Connection failed".to_string());
    assert_eq!(db_op_error.to_string(), "数据库操作错误: Connection failed");

    let employee_error = TrackerError::EmployeeNotFound { id: 42 };
    assert_eq!(employee_error.to_string(), "员工未找到: 42");

    let task_error = TrackerError::TaskNotFound { id: 123 };
    assert_eq!(task_error.to_string(), "任务未找到: 123");

    let filter_error = TrackerError::invalid_filter("priority", "status, due_date");
    assert_eq!(
        filter_error.to_string(),
        "不支持的过滤字段: priority，可用字段: status, due_date"
    );
}

#[test]
fn test_helper_constructors() {
    match TrackerError::employee_not_found(7) {
        TrackerError::EmployeeNotFound { id } => assert_eq!(id, 7),
        other => panic!("unexpected variant: {other:?}"),
    }

    match TrackerError::task_not_found(9) {
        TrackerError::TaskNotFound { id } => assert_eq!(id, 9),
        other => panic!("unexpected variant: {other:?}"),
    }

    match TrackerError::validation_error("due date in the past") {
        TrackerError::ValidationError(msg) => assert_eq!(msg, "due date in the past"),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_is_not_found() {
    assert!(TrackerError::employee_not_found(1).is_not_found());
    assert!(TrackerError::task_not_found(1).is_not_found());
    assert!(!TrackerError::validation_error("bad").is_not_found());
    assert!(!TrackerError::Internal("boom".to_string()).is_not_found());
}

#[test]
fn test_is_client_error() {
    assert!(TrackerError::task_not_found(1).is_client_error());
    assert!(TrackerError::invalid_filter("x", "y").is_client_error());
    assert!(TrackerError::validation_error("bad").is_client_error());
    assert!(!TrackerError::DatabaseOperation("down".to_string()).is_client_error());
}

#[test]
fn test_user_message() {
    assert_eq!(
        TrackerError::employee_not_found(1).user_message(),
        "请求的员工不存在"
    );
    assert_eq!(TrackerError::task_not_found(1).user_message(), "请求的任务不存在");
    assert_eq!(
        TrackerError::Internal("boom".to_string()).user_message(),
        "系统繁忙，请稍后重试"
    );
}

#[test]
fn test_from_serde_json_error() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: TrackerError = json_error.into();
    assert!(matches!(error, TrackerError::Serialization(_)));
}

#[test]
fn test_from_anyhow_error() {
    let error: TrackerError = anyhow::anyhow!("unexpected state").into();
    match error {
        TrackerError::Internal(msg) => assert!(msg.contains("unexpected state")),
        other => panic!("unexpected variant: {other:?}"),
    }
}
