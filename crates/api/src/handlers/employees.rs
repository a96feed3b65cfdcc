use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use tracker_domain::entities::{Employee, EmployeeFilter};
use tracker_errors::TrackerError;

use crate::error::ApiResult;
use crate::extract::Json;
use crate::response::{created, no_content, success, PaginatedResponse};
use crate::routes::AppState;
use crate::validation::employee::{validate_hired_date, validate_person_name, validate_text_field};

use super::{check_allowed_fields, parse_date_param, parse_pagination};

/// 员工列表的合法查询参数
const EMPLOYEE_FILTER_FIELDS: &[&str] =
    &["position", "department", "hired_date", "page", "page_size"];

/// 员工创建/更新请求。PUT 按完整表示替换，可选字段缺省即清空。
#[derive(Debug, Deserialize, Validate)]
pub struct EmployeeRequest {
    #[validate(
        length(max = 30, message = "姓氏长度不能超过30个字符"),
        custom(function = validate_person_name)
    )]
    pub last_name: String,

    #[validate(
        length(max = 30, message = "名字长度不能超过30个字符"),
        custom(function = validate_person_name)
    )]
    pub first_name: String,

    #[validate(
        length(max = 30, message = "中间名长度不能超过30个字符"),
        custom(function = validate_person_name)
    )]
    pub middle_name: Option<String>,

    #[validate(
        length(max = 100, message = "职位长度不能超过100个字符"),
        custom(function = validate_text_field)
    )]
    pub position: String,

    #[validate(
        length(max = 100, message = "部门长度不能超过100个字符"),
        custom(function = validate_text_field)
    )]
    pub department: Option<String>,

    #[validate(custom(function = validate_hired_date))]
    pub hired_date: Option<NaiveDate>,
}

impl EmployeeRequest {
    fn into_employee(self, id: i64) -> Employee {
        let mut employee = Employee::new(self.last_name, self.first_name, self.position);
        employee.id = id;
        employee.middle_name = self.middle_name;
        employee.department = self.department;
        employee.hired_date = self.hired_date;
        employee
    }
}

/// 员工 CRUD 响应，在实体字段之外附带活跃任务数
#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    #[serde(flatten)]
    pub employee: Employee,
    pub active_task_count: i64,
}

impl EmployeeResponse {
    fn new(employee: Employee, counts: &HashMap<i64, i64>) -> Self {
        let active_task_count = counts.get(&employee.id).copied().unwrap_or(0);
        Self {
            employee,
            active_task_count,
        }
    }
}

async fn active_counts(state: &AppState) -> ApiResult<HashMap<i64, i64>> {
    Ok(state
        .task_repo
        .count_active_by_assignee()
        .await?
        .into_iter()
        .collect())
}

/// 获取员工列表，支持等值过滤与分页
pub async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl axum::response::IntoResponse> {
    check_allowed_fields(&params, EMPLOYEE_FILTER_FIELDS)?;
    let pagination = parse_pagination(&params)?;

    let mut filter = EmployeeFilter {
        position: params.get("position").cloned(),
        department: params.get("department").cloned(),
        hired_date: params
            .get("hired_date")
            .map(|raw| parse_date_param("hired_date", raw))
            .transpose()?,
        ..Default::default()
    };

    let total = state.employee_repo.count(&filter).await?;

    filter.limit = Some(pagination.page_size);
    filter.offset = Some(pagination.offset());
    let items = state.employee_repo.list(&filter).await?;

    // 活跃任务数一次分组查询取齐，不逐行计数
    let counts = active_counts(&state).await?;
    let items: Vec<EmployeeResponse> = items
        .into_iter()
        .map(|employee| EmployeeResponse::new(employee, &counts))
        .collect();

    Ok(success(PaginatedResponse::new(
        items,
        total,
        pagination.page,
        pagination.page_size,
    )))
}

/// 创建员工
pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<EmployeeRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    request.validate()?;

    let employee = state.employee_repo.create(&request.into_employee(0)).await?;
    // 新建员工还没有任务
    Ok(created(EmployeeResponse {
        employee,
        active_task_count: 0,
    }))
}

/// 获取单个员工，返回其工作量视图（含活跃任务列表）
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let workload = state
        .workload
        .employee_workload(id)
        .await?
        .ok_or_else(|| TrackerError::employee_not_found(id))?;

    Ok(success(workload))
}

/// 更新员工
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<EmployeeRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    request.validate()?;

    let updated = state.employee_repo.update(&request.into_employee(id)).await?;
    let counts = active_counts(&state).await?;
    Ok(success(EmployeeResponse::new(updated, &counts)))
}

/// 删除员工，其任务改为未分配
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if !state.employee_repo.delete(id).await? {
        return Err(TrackerError::employee_not_found(id).into());
    }

    Ok(no_content())
}

/// 忙碌员工榜单：按进行中任务数降序，并列时按最近截止日期升序
pub async fn busy_employees(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let ranked = state.workload.busy_employees().await?;
    Ok(success(ranked))
}
