use chrono::NaiveDate;
use validator::ValidationError;

/// 验证任务名称非空白
pub fn validate_task_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("task_name").with_message("任务名称不能为空".into()));
    }

    Ok(())
}

/// 截止日期不能早于今天
pub fn validate_due_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < chrono::Utc::now().date_naive() {
        return Err(
            ValidationError::new("due_date").with_message("截止日期不能是过去日期".into())
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_task_name_rejects_blank() {
        assert!(validate_task_name("准备报告").is_ok());
        assert!(validate_task_name("   ").is_err());
        assert!(validate_task_name("").is_err());
    }

    #[test]
    fn test_due_date_rejects_past() {
        let today = chrono::Utc::now().date_naive();
        assert!(validate_due_date(&today).is_ok());
        assert!(validate_due_date(&(today + Duration::days(7))).is_ok());
        assert!(validate_due_date(&(today - Duration::days(1))).is_err());
    }
}
