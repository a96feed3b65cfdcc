use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

use tracker_domain::entities::{Task, TaskFilter, TaskStatus};
use tracker_errors::TrackerError;

use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::response::{created, no_content, success, PaginatedResponse};
use crate::routes::AppState;
use crate::validation::task::{validate_due_date, validate_task_name};

use super::{
    check_allowed_fields, parse_bool_param, parse_date_param, parse_i64_param, parse_pagination,
};

/// 任务列表的合法查询参数
const TASK_FILTER_FIELDS: &[&str] = &[
    "assigned_to",
    "status",
    "parent_task",
    "due_date",
    "subtasks",
    "has_parent",
    "page",
    "page_size",
];

/// 任务创建/更新请求。PUT 按完整表示替换。
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(
        length(max = 200, message = "任务名称长度不能超过200个字符"),
        custom(function = validate_task_name)
    )]
    pub name: String,

    pub description: Option<String>,
    pub parent_task_id: Option<i64>,
    pub assigned_to: Option<i64>,

    #[validate(custom(function = validate_due_date))]
    pub due_date: NaiveDate,

    pub status: Option<TaskStatus>,
}

impl TaskRequest {
    fn into_task(self, id: i64) -> Task {
        let mut task = Task::new(self.name, self.due_date);
        task.id = id;
        task.description = self.description;
        task.parent_task_id = self.parent_task_id;
        task.assigned_to = self.assigned_to;
        if let Some(status) = self.status {
            task.status = status;
        }
        task
    }
}

/// 校验请求中引用的父任务和执行人确实存在
async fn check_references(state: &AppState, request: &TaskRequest, id: i64) -> ApiResult<()> {
    if let Some(parent_id) = request.parent_task_id {
        if parent_id == id {
            return Err(TrackerError::validation_error("任务不能作为自身的父任务").into());
        }
        if state.task_repo.find_by_id(parent_id).await?.is_none() {
            return Err(
                TrackerError::validation_error(format!("父任务不存在: {parent_id}")).into(),
            );
        }
    }

    if let Some(employee_id) = request.assigned_to {
        if state.employee_repo.find_by_id(employee_id).await?.is_none() {
            return Err(
                TrackerError::validation_error(format!("执行人不存在: {employee_id}")).into(),
            );
        }
    }

    Ok(())
}

/// 获取任务列表，支持等值过滤、层级过滤与分页
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl axum::response::IntoResponse> {
    check_allowed_fields(&params, TASK_FILTER_FIELDS)?;
    let pagination = parse_pagination(&params)?;

    let status = params
        .get("status")
        .map(|raw| {
            raw.parse::<TaskStatus>()
                .map_err(|_| ApiError::BadRequest(format!("status 参数无效: {raw}")))
        })
        .transpose()?;

    let mut filter = TaskFilter {
        assigned_to: params
            .get("assigned_to")
            .map(|raw| parse_i64_param("assigned_to", raw))
            .transpose()?,
        status,
        parent_task_id: params
            .get("parent_task")
            .map(|raw| parse_i64_param("parent_task", raw))
            .transpose()?,
        due_date: params
            .get("due_date")
            .map(|raw| parse_date_param("due_date", raw))
            .transpose()?,
        has_subtasks: params
            .get("subtasks")
            .map(|raw| parse_bool_param("subtasks", raw))
            .transpose()?,
        has_parent: params
            .get("has_parent")
            .map(|raw| parse_bool_param("has_parent", raw))
            .transpose()?,
        ..Default::default()
    };

    let total = state.task_repo.count(&filter).await?;

    filter.limit = Some(pagination.page_size);
    filter.offset = Some(pagination.offset());
    let items = state.task_repo.list(&filter).await?;

    Ok(success(PaginatedResponse::new(
        items,
        total,
        pagination.page,
        pagination.page_size,
    )))
}

/// 创建任务
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<TaskRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    request.validate()?;
    check_references(&state, &request, 0).await?;

    let task = state.task_repo.create(&request.into_task(0)).await?;
    Ok(created(task))
}

/// 获取单个任务
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let task = state
        .task_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| TrackerError::task_not_found(id))?;

    Ok(success(task))
}

/// 更新任务
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<TaskRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    request.validate()?;
    check_references(&state, &request, id).await?;

    let updated = state.task_repo.update(&request.into_task(id)).await?;
    Ok(success(updated))
}

/// 删除任务，其子任务升级为根任务
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if !state.task_repo.delete(id).await? {
        return Err(TrackerError::task_not_found(id).into());
    }

    Ok(no_content())
}

/// 重要任务：未开始且父任务进行中，附带可接手的员工
pub async fn important_tasks(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let tasks = state.important.important_tasks().await?;
    Ok(success(tasks))
}
