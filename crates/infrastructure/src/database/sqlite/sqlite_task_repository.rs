use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use tracker_domain::entities::{Task, TaskFilter, TaskStatus};
use tracker_domain::repositories::TaskRepository;
use tracker_errors::{TrackerError, TrackerResult};

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> TrackerResult<Task> {
        Ok(Task {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            parent_task_id: row.try_get("parent_task_id")?,
            assigned_to: row.try_get("assigned_to")?,
            due_date: row.try_get("due_date")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const TASK_COLUMNS: &str =
    "id, name, description, parent_task_id, assigned_to, due_date, status, created_at, updated_at";

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    #[instrument(skip(self, task), fields(task_name = %task.name))]
    async fn create(&self, task: &Task) -> TrackerResult<Task> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tasks (name, description, parent_task_id, assigned_to, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.parent_task_id)
        .bind(task.assigned_to)
        .bind(task.due_date)
        .bind(task.status)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_task(&row)?;
        debug!("创建任务成功: {}", created.entity_description());
        Ok(created)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_task).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[i64]) -> TrackerResult<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("${i}")).collect();
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id IN ({}) ORDER BY id",
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &TaskFilter) -> TrackerResult<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE 1=1");
        let mut idx = 0;

        if filter.assigned_to.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND assigned_to = ${idx}"));
        }
        if filter.status.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND status = ${idx}"));
        }
        if filter.parent_task_id.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND parent_task_id = ${idx}"));
        }
        if filter.due_date.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND due_date = ${idx}"));
        }
        match filter.has_subtasks {
            Some(true) => {
                sql.push_str(" AND EXISTS (SELECT 1 FROM tasks c WHERE c.parent_task_id = tasks.id)")
            }
            Some(false) => sql.push_str(
                " AND NOT EXISTS (SELECT 1 FROM tasks c WHERE c.parent_task_id = tasks.id)",
            ),
            None => {}
        }
        match filter.has_parent {
            Some(true) => sql.push_str(" AND parent_task_id IS NOT NULL"),
            Some(false) => sql.push_str(" AND parent_task_id IS NULL"),
            None => {}
        }
        sql.push_str(" ORDER BY id");
        if filter.limit.is_some() {
            idx += 1;
            sql.push_str(&format!(" LIMIT ${idx}"));
        } else if filter.offset.is_some() {
            // SQLite要求OFFSET前必须有LIMIT
            sql.push_str(" LIMIT -1");
        }
        if filter.offset.is_some() {
            idx += 1;
            sql.push_str(&format!(" OFFSET ${idx}"));
        }

        let mut query = sqlx::query(&sql);
        if let Some(assigned_to) = filter.assigned_to {
            query = query.bind(assigned_to);
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(parent_task_id) = filter.parent_task_id {
            query = query.bind(parent_task_id);
        }
        if let Some(due_date) = filter.due_date {
            query = query.bind(due_date);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.bind(offset);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: &TaskFilter) -> TrackerResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS total FROM tasks WHERE 1=1");
        let mut idx = 0;

        if filter.assigned_to.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND assigned_to = ${idx}"));
        }
        if filter.status.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND status = ${idx}"));
        }
        if filter.parent_task_id.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND parent_task_id = ${idx}"));
        }
        if filter.due_date.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND due_date = ${idx}"));
        }
        match filter.has_subtasks {
            Some(true) => {
                sql.push_str(" AND EXISTS (SELECT 1 FROM tasks c WHERE c.parent_task_id = tasks.id)")
            }
            Some(false) => sql.push_str(
                " AND NOT EXISTS (SELECT 1 FROM tasks c WHERE c.parent_task_id = tasks.id)",
            ),
            None => {}
        }
        match filter.has_parent {
            Some(true) => sql.push_str(" AND parent_task_id IS NOT NULL"),
            Some(false) => sql.push_str(" AND parent_task_id IS NULL"),
            None => {}
        }

        let mut query = sqlx::query(&sql);
        if let Some(assigned_to) = filter.assigned_to {
            query = query.bind(assigned_to);
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(parent_task_id) = filter.parent_task_id {
            query = query.bind(parent_task_id);
        }
        if let Some(due_date) = filter.due_date {
            query = query.bind(due_date);
        }

        let row = query.fetch_one(&self.pool).await?;
        Ok(row.try_get("total")?)
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn update(&self, task: &Task) -> TrackerResult<Task> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE tasks
            SET name = $1, description = $2, parent_task_id = $3, assigned_to = $4,
                due_date = $5, status = $6, updated_at = CURRENT_TIMESTAMP
            WHERE id = $7
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.parent_task_id)
        .bind(task.assigned_to)
        .bind(task.due_date)
        .bind(task.status)
        .bind(task.id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let updated = Self::row_to_task(&row)?;
                debug!("更新任务成功: {}", updated.entity_description());
                Ok(updated)
            }
            None => Err(TrackerError::task_not_found(task.id)),
        }
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn delete(&self, id: i64) -> TrackerResult<bool> {
        // 外键约束 ON DELETE SET NULL 负责清空子任务上的 parent_task_id
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            debug!("删除任务成功: ID {}", id);
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn find_active(&self) -> TrackerResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE status IN ('new', 'in_progress') ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self))]
    async fn find_important(&self) -> TrackerResult<Vec<Task>> {
        // 重要任务: 自身未开始，且父任务正在进行中
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM tasks t
            INNER JOIN tasks p ON t.parent_task_id = p.id
            WHERE t.status = 'new' AND p.status = 'in_progress'
            ORDER BY t.id
            "#,
            TASK_COLUMNS
                .split(", ")
                .map(|c| format!("t.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self))]
    async fn count_by_assignee(&self) -> TrackerResult<Vec<(i64, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT assigned_to, COUNT(*) AS task_count
            FROM tasks
            WHERE assigned_to IS NOT NULL
            GROUP BY assigned_to
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<i64, _>("assigned_to")?,
                    row.try_get::<i64, _>("task_count")?,
                ))
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn count_active_by_assignee(&self) -> TrackerResult<Vec<(i64, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT assigned_to, COUNT(*) AS task_count
            FROM tasks
            WHERE assigned_to IS NOT NULL AND status IN ('new', 'in_progress')
            GROUP BY assigned_to
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<i64, _>("assigned_to")?,
                    row.try_get::<i64, _>("task_count")?,
                ))
            })
            .collect()
    }
}
