//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;

use crate::entities::{Employee, EmployeeFilter, Task, TaskFilter};
use tracker_errors::TrackerResult;

/// 员工仓储抽象
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn create(&self, employee: &Employee) -> TrackerResult<Employee>;
    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Employee>>;
    /// 按 id 升序返回全部员工
    async fn find_all(&self) -> TrackerResult<Vec<Employee>>;
    async fn list(&self, filter: &EmployeeFilter) -> TrackerResult<Vec<Employee>>;
    /// 满足过滤条件的员工总数，忽略分页参数
    async fn count(&self, filter: &EmployeeFilter) -> TrackerResult<i64>;
    async fn update(&self, employee: &Employee) -> TrackerResult<Employee>;
    /// 删除员工。引用该员工的任务的 assigned_to 由数据库置空，任务本身保留。
    async fn delete(&self, id: i64) -> TrackerResult<bool>;
}

/// 任务仓储抽象
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> TrackerResult<Task>;
    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Task>>;
    async fn find_by_ids(&self, ids: &[i64]) -> TrackerResult<Vec<Task>>;
    async fn list(&self, filter: &TaskFilter) -> TrackerResult<Vec<Task>>;
    /// 满足过滤条件的任务总数，忽略分页参数
    async fn count(&self, filter: &TaskFilter) -> TrackerResult<i64>;
    async fn update(&self, task: &Task) -> TrackerResult<Task>;
    /// 删除任务。子任务的 parent_task_id 由数据库置空，子任务升级为顶层任务。
    async fn delete(&self, id: i64) -> TrackerResult<bool>;
    /// 全部活跃任务（状态为 new 或 in_progress），按 id 升序
    async fn find_active(&self) -> TrackerResult<Vec<Task>>;
    /// 状态为 new 且父任务状态为 in_progress 的任务
    async fn find_important(&self) -> TrackerResult<Vec<Task>>;
    /// 每个员工名下的任务总数（不限状态），一次分组查询
    async fn count_by_assignee(&self) -> TrackerResult<Vec<(i64, i64)>>;
    /// 每个员工名下的活跃任务数（new 或 in_progress），一次分组查询
    async fn count_active_by_assignee(&self) -> TrackerResult<Vec<(i64, i64)>>;
}
