//! # Tracker API
//!
//! 任务跟踪系统的REST API模块，基于Axum框架构建。
//!
//! ## API 端点
//!
//! ### 员工管理
//! - `GET /api/employees` - 获取员工列表（支持过滤与分页）
//! - `POST /api/employees` - 创建员工
//! - `GET /api/employees/busy` - 忙碌员工榜单
//! - `GET /api/employees/{id}` - 获取员工详情
//! - `PUT /api/employees/{id}` - 更新员工
//! - `DELETE /api/employees/{id}` - 删除员工
//!
//! ### 任务管理
//! - `GET /api/tasks` - 获取任务列表（支持过滤与分页）
//! - `POST /api/tasks` - 创建任务
//! - `GET /api/tasks/important` - 重要任务及可接手的员工
//! - `GET /api/tasks/{id}` - 获取任务详情
//! - `PUT /api/tasks/{id}` - 更新任务
//! - `DELETE /api/tasks/{id}` - 删除任务
//!
//! ### 系统
//! - `GET /health` - 健康检查
//!
//! 列表端点只接受允许列表内的查询参数，未知参数会返回400并同时
//! 列出非法字段和可用字段。

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, trace_layer};
use routes::{create_routes, AppState};
use tracker_domain::repositories::{EmployeeRepository, TaskRepository};

/// 创建完整的API应用
pub fn create_app(
    employee_repo: Arc<dyn EmployeeRepository>,
    task_repo: Arc<dyn TaskRepository>,
    api_config: &tracker_config::ApiConfig,
) -> Router {
    let auth = convert_auth_config(&api_config.auth);
    let state = AppState::new(employee_repo, task_repo, auth);

    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}

fn convert_auth_config(config: &tracker_config::AuthConfig) -> Arc<auth::AuthConfig> {
    Arc::new(auth::AuthConfig {
        enabled: config.enabled,
        key_digests: config.api_key_hashes.iter().cloned().collect(),
    })
}
