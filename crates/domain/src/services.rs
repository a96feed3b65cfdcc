//! 领域服务
//!
//! 两个派生查询的业务逻辑: 员工工作量排名和重要任务筛选。
//! 排序和筛选本身是纯函数，服务结构体只负责通过仓储取数，
//! 便于单独测试业务规则。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{Employee, Task, TaskStatus};
use crate::repositories::{EmployeeRepository, TaskRepository};
use tracker_errors::TrackerResult;

/// 允许接手父任务执行者超出最小负载的任务数
pub const PARENT_ASSIGNEE_SLACK: i64 = 2;

/// 单个员工的活跃工作量
#[derive(Debug, Clone)]
pub struct EmployeeWorkload {
    pub employee: Employee,
    pub active_tasks: Vec<Task>,
    pub earliest_due_date: Option<NaiveDate>,
}

impl EmployeeWorkload {
    pub fn active_task_count(&self) -> usize {
        self.active_tasks.len()
    }
}

/// 按工作量排名: 活跃任务数降序，再按最早截止日期升序。
/// 没有活跃任务的员工也在结果中（计数为 0，排在同计数分组的最后）。
/// 计数与日期都相同时保持传入的枚举顺序。
pub fn rank_by_workload(employees: Vec<Employee>, active_tasks: Vec<Task>) -> Vec<EmployeeWorkload> {
    let mut tasks_by_assignee: HashMap<i64, Vec<Task>> = HashMap::new();
    for task in active_tasks {
        if let Some(employee_id) = task.assigned_to {
            tasks_by_assignee.entry(employee_id).or_default().push(task);
        }
    }

    let mut workloads: Vec<EmployeeWorkload> = employees
        .into_iter()
        .map(|employee| {
            let active_tasks = tasks_by_assignee.remove(&employee.id).unwrap_or_default();
            let earliest_due_date = active_tasks.iter().map(|t| t.due_date).min();
            EmployeeWorkload {
                employee,
                active_tasks,
                earliest_due_date,
            }
        })
        .collect();

    // sort_by 是稳定排序，平局时保留枚举顺序
    workloads.sort_by(|a, b| {
        b.active_task_count()
            .cmp(&a.active_task_count())
            .then_with(|| match (a.earliest_due_date, b.earliest_due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });

    workloads
}

/// 计算一个重要任务的候选员工标签。
///
/// 候选条件: 任务总数等于全员最小值，或者该员工正在执行此任务的
/// 父任务且总数不超过最小值加 [`PARENT_ASSIGNEE_SLACK`]。
/// 没有员工时返回空列表。
pub fn eligible_assignees(
    employees: &[Employee],
    totals: &HashMap<i64, i64>,
    parent_assignee: Option<i64>,
) -> Vec<String> {
    let min_count = match employees
        .iter()
        .map(|e| totals.get(&e.id).copied().unwrap_or(0))
        .min()
    {
        Some(min) => min,
        None => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for employee in employees {
        let count = totals.get(&employee.id).copied().unwrap_or(0);
        let works_on_parent = parent_assignee == Some(employee.id);
        if count == min_count || (works_on_parent && count <= min_count + PARENT_ASSIGNEE_SLACK) {
            if seen.insert(employee.id) {
                labels.push(employee.display_label());
            }
        }
    }
    labels
}

/// 任务摘要里嵌套的父任务信息
#[derive(Debug, Clone, Serialize)]
pub struct TaskBrief {
    pub id: i64,
    pub name: String,
    pub due_date: NaiveDate,
}

/// 忙碌员工列表中的任务摘要
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub id: i64,
    pub name: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub parent_task: Option<TaskBrief>,
}

/// 忙碌员工排名的单项输出
#[derive(Debug, Clone, Serialize)]
pub struct BusyEmployee {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub position: String,
    pub hired_date: Option<NaiveDate>,
    pub active_task_count: usize,
    pub earliest_due_date: Option<NaiveDate>,
    pub tasks: Vec<TaskSummary>,
}

/// 重要任务及其候选员工
#[derive(Debug, Clone, Serialize)]
pub struct ImportantTask {
    pub id: i64,
    pub name: String,
    pub due_date: NaiveDate,
    pub potential_employees: Vec<String>,
}

/// 员工工作量排名服务
pub struct WorkloadService {
    employee_repo: Arc<dyn EmployeeRepository>,
    task_repo: Arc<dyn TaskRepository>,
}

impl WorkloadService {
    pub fn new(
        employee_repo: Arc<dyn EmployeeRepository>,
        task_repo: Arc<dyn TaskRepository>,
    ) -> Self {
        Self {
            employee_repo,
            task_repo,
        }
    }

    /// 每次请求基于当前的持久化快照重新计算，只读，无副作用
    pub async fn busy_employees(&self) -> TrackerResult<Vec<BusyEmployee>> {
        let employees = self.employee_repo.find_all().await?;
        let active_tasks = self.task_repo.find_active().await?;
        let parents = self.fetch_parents(&active_tasks).await?;

        let workloads = rank_by_workload(employees, active_tasks);

        Ok(workloads
            .into_iter()
            .map(|workload| Self::to_busy_employee(workload, &parents))
            .collect())
    }

    /// 单个员工的工作量视图（含活跃任务列表），员工不存在时返回 None
    pub async fn employee_workload(&self, id: i64) -> TrackerResult<Option<BusyEmployee>> {
        let employee = match self.employee_repo.find_by_id(id).await? {
            Some(employee) => employee,
            None => return Ok(None),
        };

        let active_tasks: Vec<Task> = self
            .task_repo
            .find_active()
            .await?
            .into_iter()
            .filter(|task| task.assigned_to == Some(id))
            .collect();
        let parents = self.fetch_parents(&active_tasks).await?;

        Ok(rank_by_workload(vec![employee], active_tasks)
            .into_iter()
            .next()
            .map(|workload| Self::to_busy_employee(workload, &parents)))
    }

    /// 父任务摘要一次批量取出，避免逐条查询
    async fn fetch_parents(&self, tasks: &[Task]) -> TrackerResult<HashMap<i64, Task>> {
        let parent_ids: Vec<i64> = {
            let mut ids: Vec<i64> = tasks.iter().filter_map(|t| t.parent_task_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };

        Ok(self
            .task_repo
            .find_by_ids(&parent_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect())
    }

    fn to_busy_employee(workload: EmployeeWorkload, parents: &HashMap<i64, Task>) -> BusyEmployee {
        let tasks = workload
            .active_tasks
            .iter()
            .map(|task| TaskSummary {
                id: task.id,
                name: task.name.clone(),
                due_date: task.due_date,
                status: task.status,
                parent_task: task.parent_task_id.and_then(|pid| {
                    parents.get(&pid).map(|parent| TaskBrief {
                        id: parent.id,
                        name: parent.name.clone(),
                        due_date: parent.due_date,
                    })
                }),
            })
            .collect();

        BusyEmployee {
            id: workload.employee.id,
            last_name: workload.employee.last_name.clone(),
            first_name: workload.employee.first_name.clone(),
            middle_name: workload.employee.middle_name.clone(),
            position: workload.employee.position.clone(),
            hired_date: workload.employee.hired_date,
            active_task_count: workload.active_task_count(),
            earliest_due_date: workload.earliest_due_date,
            tasks,
        }
    }
}

/// 重要任务筛选服务
pub struct ImportantTaskService {
    employee_repo: Arc<dyn EmployeeRepository>,
    task_repo: Arc<dyn TaskRepository>,
}

impl ImportantTaskService {
    pub fn new(
        employee_repo: Arc<dyn EmployeeRepository>,
        task_repo: Arc<dyn TaskRepository>,
    ) -> Self {
        Self {
            employee_repo,
            task_repo,
        }
    }

    /// 状态为 new 且父任务 in_progress 的任务，附带候选员工。
    /// 每个员工的任务总数只统计一次。
    pub async fn important_tasks(&self) -> TrackerResult<Vec<ImportantTask>> {
        let tasks = self.task_repo.find_important().await?;
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let employees = self.employee_repo.find_all().await?;
        let totals: HashMap<i64, i64> = self
            .task_repo
            .count_by_assignee()
            .await?
            .into_iter()
            .collect();

        let parent_ids: Vec<i64> = {
            let mut ids: Vec<i64> = tasks.iter().filter_map(|t| t.parent_task_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let parents: HashMap<i64, Task> = self
            .task_repo
            .find_by_ids(&parent_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(tasks
            .into_iter()
            .map(|task| {
                let parent_assignee = task
                    .parent_task_id
                    .and_then(|pid| parents.get(&pid))
                    .and_then(|parent| parent.assigned_to);
                let potential_employees =
                    eligible_assignees(&employees, &totals, parent_assignee);
                ImportantTask {
                    id: task.id,
                    name: task.name,
                    due_date: task.due_date,
                    potential_employees,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockEmployeeRepository, MockTaskRepository};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn employee(id: i64, last_name: &str, first_name: &str) -> Employee {
        let mut employee = Employee::new(
            last_name.to_string(),
            first_name.to_string(),
            "Engineer".to_string(),
        );
        employee.id = id;
        employee
    }

    fn task(id: i64, assigned_to: Option<i64>, status: TaskStatus, due: &str) -> Task {
        let mut task = Task::new(format!("task-{id}"), date(due));
        task.id = id;
        task.assigned_to = assigned_to;
        task.status = status;
        task
    }

    #[test]
    fn test_rank_by_workload_scenario() {
        // A: 2个活跃任务，最早2024-08-01；B: 2个，最早2024-09-01；C: 1个，2024-09-15
        let employees = vec![employee(1, "A", "a"), employee(2, "B", "b"), employee(3, "C", "c")];
        let tasks = vec![
            task(10, Some(1), TaskStatus::New, "2024-08-01"),
            task(11, Some(1), TaskStatus::InProgress, "2024-10-01"),
            task(12, Some(2), TaskStatus::New, "2024-09-01"),
            task(13, Some(2), TaskStatus::New, "2024-11-01"),
            task(14, Some(3), TaskStatus::InProgress, "2024-09-15"),
        ];

        let ranked = rank_by_workload(employees, tasks);
        let order: Vec<i64> = ranked.iter().map(|w| w.employee.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(ranked[0].earliest_due_date, Some(date("2024-08-01")));
        assert_eq!(ranked[1].earliest_due_date, Some(date("2024-09-01")));
    }

    #[test]
    fn test_rank_sort_keys_hold_for_any_input() {
        let employees = vec![
            employee(1, "A", "a"),
            employee(2, "B", "b"),
            employee(3, "C", "c"),
            employee(4, "D", "d"),
        ];
        let tasks = vec![
            task(10, Some(2), TaskStatus::New, "2024-05-01"),
            task(11, Some(3), TaskStatus::InProgress, "2024-04-01"),
            task(12, Some(3), TaskStatus::New, "2024-06-01"),
            task(13, Some(4), TaskStatus::New, "2024-05-01"),
        ];

        let ranked = rank_by_workload(employees, tasks);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.active_task_count() >= b.active_task_count());
            if a.active_task_count() == b.active_task_count() {
                match (a.earliest_due_date, b.earliest_due_date) {
                    (Some(x), Some(y)) => assert!(x <= y),
                    (None, Some(_)) => panic!("absent due date must sort last"),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_rank_includes_idle_employees() {
        let employees = vec![employee(1, "Idle", "i"), employee(2, "Busy", "b")];
        let tasks = vec![task(10, Some(2), TaskStatus::New, "2024-08-01")];

        let ranked = rank_by_workload(employees, tasks);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].employee.id, 2);
        assert_eq!(ranked[1].employee.id, 1);
        assert_eq!(ranked[1].active_task_count(), 0);
        assert!(ranked[1].active_tasks.is_empty());
        assert_eq!(ranked[1].earliest_due_date, None);
    }

    #[test]
    fn test_rank_ignores_unassigned_tasks() {
        let employees = vec![employee(1, "Solo", "s")];
        let tasks = vec![
            task(10, None, TaskStatus::New, "2024-01-01"),
            task(11, Some(1), TaskStatus::New, "2024-02-01"),
        ];

        let ranked = rank_by_workload(employees, tasks);
        assert_eq!(ranked[0].active_task_count(), 1);
        assert_eq!(ranked[0].earliest_due_date, Some(date("2024-02-01")));
    }

    #[test]
    fn test_eligible_assignees_min_count() {
        let employees = vec![employee(1, "A", "a"), employee(2, "B", "b"), employee(3, "C", "c")];
        let totals = HashMap::from([(1, 1), (2, 3), (3, 1)]);

        let labels = eligible_assignees(&employees, &totals, None);
        assert_eq!(labels, vec!["A a. ID:1".to_string(), "C c. ID:3".to_string()]);
    }

    #[test]
    fn test_eligible_assignees_parent_assignee_within_slack() {
        // 员工2执行父任务，总数 3 <= 1 + 2，入选
        let employees = vec![employee(1, "A", "a"), employee(2, "B", "b")];
        let totals = HashMap::from([(1, 1), (2, 3)]);

        let labels = eligible_assignees(&employees, &totals, Some(2));
        assert_eq!(labels, vec!["A a. ID:1".to_string(), "B b. ID:2".to_string()]);
    }

    #[test]
    fn test_eligible_assignees_parent_assignee_beyond_slack() {
        // 员工2执行父任务，但总数 4 > 1 + 2，落选
        let employees = vec![employee(1, "A", "a"), employee(2, "B", "b")];
        let totals = HashMap::from([(1, 1), (2, 4)]);

        let labels = eligible_assignees(&employees, &totals, Some(2));
        assert_eq!(labels, vec!["A a. ID:1".to_string()]);
    }

    #[test]
    fn test_eligible_assignees_deduplicates() {
        // 父任务执行者同时也是最小负载员工，只出现一次
        let employees = vec![employee(1, "A", "a")];
        let totals = HashMap::from([(1, 0)]);

        let labels = eligible_assignees(&employees, &totals, Some(1));
        assert_eq!(labels, vec!["A a. ID:1".to_string()]);
    }

    #[test]
    fn test_eligible_assignees_no_employees() {
        let totals = HashMap::new();
        let labels = eligible_assignees(&[], &totals, Some(1));
        assert!(labels.is_empty());
    }

    #[test]
    fn test_eligible_assignees_missing_totals_default_to_zero() {
        let employees = vec![employee(1, "A", "a"), employee(2, "B", "b")];
        let totals = HashMap::from([(2, 2)]);

        let labels = eligible_assignees(&employees, &totals, None);
        assert_eq!(labels, vec!["A a. ID:1".to_string()]);
    }

    #[tokio::test]
    async fn test_workload_service_builds_parent_briefs() {
        let mut employee_repo = MockEmployeeRepository::new();
        employee_repo
            .expect_find_all()
            .returning(|| Ok(vec![employee(1, "A", "a")]));

        let parent = task(5, None, TaskStatus::InProgress, "2024-07-01");
        let mut child = task(6, Some(1), TaskStatus::New, "2024-08-01");
        child.parent_task_id = Some(5);

        let mut task_repo = MockTaskRepository::new();
        {
            let child = child.clone();
            task_repo
                .expect_find_active()
                .returning(move || Ok(vec![child.clone()]));
        }
        {
            let parent = parent.clone();
            task_repo.expect_find_by_ids().returning(move |ids| {
                assert_eq!(ids, [5]);
                Ok(vec![parent.clone()])
            });
        }

        let service = WorkloadService::new(Arc::new(employee_repo), Arc::new(task_repo));
        let busy = service.busy_employees().await.unwrap();

        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].active_task_count, 1);
        let summary = &busy[0].tasks[0];
        assert_eq!(summary.id, 6);
        let brief = summary.parent_task.as_ref().unwrap();
        assert_eq!(brief.id, 5);
        assert_eq!(brief.due_date, date("2024-07-01"));
    }

    #[tokio::test]
    async fn test_employee_workload_filters_other_assignees() {
        let mut employee_repo = MockEmployeeRepository::new();
        employee_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, "A", "a"))));

        let mut task_repo = MockTaskRepository::new();
        task_repo.expect_find_active().returning(|| {
            Ok(vec![
                task(1, Some(1), TaskStatus::New, "2024-08-01"),
                task(2, Some(2), TaskStatus::InProgress, "2024-07-01"),
            ])
        });
        task_repo.expect_find_by_ids().returning(|_| Ok(vec![]));

        let service = WorkloadService::new(Arc::new(employee_repo), Arc::new(task_repo));
        let workload = service.employee_workload(1).await.unwrap().unwrap();

        assert_eq!(workload.id, 1);
        assert_eq!(workload.active_task_count, 1);
        assert_eq!(workload.tasks.len(), 1);
        assert_eq!(workload.tasks[0].id, 1);
        assert_eq!(workload.earliest_due_date, Some(date("2024-08-01")));
    }

    #[tokio::test]
    async fn test_employee_workload_missing_employee() {
        let mut employee_repo = MockEmployeeRepository::new();
        employee_repo.expect_find_by_id().returning(|_| Ok(None));

        let task_repo = MockTaskRepository::new();

        let service = WorkloadService::new(Arc::new(employee_repo), Arc::new(task_repo));
        assert!(service.employee_workload(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_important_task_service_resolves_parent_assignee() {
        let mut employee_repo = MockEmployeeRepository::new();
        employee_repo.expect_find_all().returning(|| {
            Ok(vec![employee(1, "A", "a"), employee(2, "B", "b")])
        });

        let mut parent = task(5, Some(2), TaskStatus::InProgress, "2024-07-01");
        parent.assigned_to = Some(2);
        let mut important = task(6, None, TaskStatus::New, "2024-08-01");
        important.parent_task_id = Some(5);

        let mut task_repo = MockTaskRepository::new();
        {
            let important = important.clone();
            task_repo
                .expect_find_important()
                .returning(move || Ok(vec![important.clone()]));
        }
        task_repo
            .expect_count_by_assignee()
            .returning(|| Ok(vec![(1, 1), (2, 3)]));
        {
            let parent = parent.clone();
            task_repo
                .expect_find_by_ids()
                .returning(move |_| Ok(vec![parent.clone()]));
        }

        let service = ImportantTaskService::new(Arc::new(employee_repo), Arc::new(task_repo));
        let important_tasks = service.important_tasks().await.unwrap();

        assert_eq!(important_tasks.len(), 1);
        // 员工1负载最小；员工2执行父任务且 3 <= 1 + 2
        assert_eq!(
            important_tasks[0].potential_employees,
            vec!["A a. ID:1".to_string(), "B b. ID:2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_important_task_service_no_employees() {
        let mut employee_repo = MockEmployeeRepository::new();
        employee_repo.expect_find_all().returning(|| Ok(vec![]));

        let mut important = task(6, None, TaskStatus::New, "2024-08-01");
        important.parent_task_id = Some(5);

        let mut task_repo = MockTaskRepository::new();
        {
            let important = important.clone();
            task_repo
                .expect_find_important()
                .returning(move || Ok(vec![important.clone()]));
        }
        task_repo.expect_count_by_assignee().returning(|| Ok(vec![]));
        task_repo.expect_find_by_ids().returning(|_| Ok(vec![]));

        let service = ImportantTaskService::new(Arc::new(employee_repo), Arc::new(task_repo));
        let important_tasks = service.important_tasks().await.unwrap();

        assert_eq!(important_tasks.len(), 1);
        assert!(important_tasks[0].potential_employees.is_empty());
    }
}
