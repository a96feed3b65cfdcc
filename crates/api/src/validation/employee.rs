use chrono::NaiveDate;
use validator::ValidationError;

/// 验证姓名字段：仅允许字母和连字符
pub fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("person_name").with_message("姓名不能为空".into()));
    }

    if !name.chars().all(|c| c.is_alphabetic() || c == '-') {
        return Err(
            ValidationError::new("person_name").with_message("姓名只能包含字母和连字符".into())
        );
    }

    Ok(())
}

/// 验证职位或部门字段非空白
pub fn validate_text_field(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("text_field").with_message("字段不能为空".into()));
    }

    Ok(())
}

/// 入职日期不能晚于今天
pub fn validate_hired_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > chrono::Utc::now().date_naive() {
        return Err(
            ValidationError::new("hired_date").with_message("入职日期不能是未来日期".into())
        );
    }

    Ok(())
}
