pub mod employees;
pub mod health;
pub mod tasks;

use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};
use tracker_errors::TrackerError;

pub(crate) const DEFAULT_PAGE_SIZE: i64 = 20;
pub(crate) const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// 拒绝允许列表之外的查询参数，报错时同时列出非法字段和可用字段
pub(crate) fn check_allowed_fields(
    params: &HashMap<String, String>,
    allowed: &[&str],
) -> ApiResult<()> {
    let mut offending: Vec<&str> = params
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();

    if offending.is_empty() {
        return Ok(());
    }

    offending.sort_unstable();
    Err(TrackerError::invalid_filter(offending.join(", "), allowed.join(", ")).into())
}

pub(crate) fn parse_pagination(params: &HashMap<String, String>) -> ApiResult<Pagination> {
    let page = match params.get("page") {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| ApiError::BadRequest(format!("page 参数无效: {raw}")))?,
        None => 1,
    };

    let page_size = match params.get("page_size") {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| ApiError::BadRequest(format!("page_size 参数无效: {raw}")))?
            .min(MAX_PAGE_SIZE),
        None => DEFAULT_PAGE_SIZE,
    };

    Ok(Pagination { page, page_size })
}

pub(crate) fn parse_date_param(name: &str, raw: &str) -> ApiResult<chrono::NaiveDate> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{name} 参数不是有效日期: {raw}")))
}

/// 布尔参数接受 true/false/1/0
pub(crate) fn parse_bool_param(name: &str, raw: &str) -> ApiResult<bool> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ApiError::BadRequest(format!(
            "{name} 参数不是有效布尔值: {raw}"
        ))),
    }
}

pub(crate) fn parse_i64_param(name: &str, raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{name} 参数不是有效整数: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_check_allowed_fields_accepts_known() {
        let params = params(&[("position", "Dev"), ("page", "1")]);
        assert!(check_allowed_fields(&params, &["position", "page"]).is_ok());
    }

    #[test]
    fn test_check_allowed_fields_names_offenders_and_allowed() {
        let params = params(&[("color", "red"), ("shape", "round")]);
        let error = check_allowed_fields(&params, &["position", "department"]).unwrap_err();

        match error {
            ApiError::Tracker(TrackerError::InvalidFilter { fields, allowed }) => {
                assert_eq!(fields, "color, shape");
                assert_eq!(allowed, "position, department");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_pagination_defaults_and_cap() {
        let pagination = parse_pagination(&params(&[])).unwrap();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, DEFAULT_PAGE_SIZE);

        let pagination = parse_pagination(&params(&[("page", "3"), ("page_size", "500")])).unwrap();
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.page_size, MAX_PAGE_SIZE);
        assert_eq!(pagination.offset(), 200);
    }

    #[test]
    fn test_parse_pagination_rejects_garbage() {
        assert!(parse_pagination(&params(&[("page", "0")])).is_err());
        assert!(parse_pagination(&params(&[("page_size", "abc")])).is_err());
    }

    #[test]
    fn test_parse_bool_param() {
        assert!(parse_bool_param("has_parent", "true").unwrap());
        assert!(parse_bool_param("has_parent", "1").unwrap());
        assert!(!parse_bool_param("has_parent", "false").unwrap());
        assert!(!parse_bool_param("has_parent", "0").unwrap());
        assert!(parse_bool_param("has_parent", "yes").is_err());
    }

    #[test]
    fn test_parse_date_param() {
        assert!(parse_date_param("due_date", "2026-09-01").is_ok());
        assert!(parse_date_param("due_date", "01/09/2026").is_err());
    }
}
