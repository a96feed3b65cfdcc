use axum::{routing::get, Router};
use std::sync::Arc;

use tracker_domain::repositories::{EmployeeRepository, TaskRepository};
use tracker_domain::services::{ImportantTaskService, WorkloadService};

use crate::auth::AuthConfig;
use crate::handlers::{
    employees::{
        busy_employees, create_employee, delete_employee, get_employee, list_employees,
        update_employee,
    },
    health::health_check,
    tasks::{create_task, delete_task, get_task, important_tasks, list_tasks, update_task},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub employee_repo: Arc<dyn EmployeeRepository>,
    pub task_repo: Arc<dyn TaskRepository>,
    pub workload: Arc<WorkloadService>,
    pub important: Arc<ImportantTaskService>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        employee_repo: Arc<dyn EmployeeRepository>,
        task_repo: Arc<dyn TaskRepository>,
        auth: Arc<AuthConfig>,
    ) -> Self {
        let workload = Arc::new(WorkloadService::new(
            employee_repo.clone(),
            task_repo.clone(),
        ));
        let important = Arc::new(ImportantTaskService::new(
            employee_repo.clone(),
            task_repo.clone(),
        ));

        Self {
            employee_repo,
            task_repo,
            workload,
            important,
            auth,
        }
    }
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 员工管理API
        .route("/api/employees", get(list_employees).post(create_employee))
        .route("/api/employees/busy", get(busy_employees))
        .route(
            "/api/employees/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        // 任务管理API
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/important", get(important_tasks))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::api_key_auth,
        ))
        .with_state(state)
}
