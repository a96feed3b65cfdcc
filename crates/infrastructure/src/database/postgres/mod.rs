//! PostgreSQL 后端：迁移与仓储实现

mod postgres_employee_repository;
mod postgres_task_repository;

pub use postgres_employee_repository::PostgresEmployeeRepository;
pub use postgres_task_repository::PostgresTaskRepository;

use sqlx::PgPool;
use tracing::info;
use tracker_errors::TrackerResult;

/// 建表与索引，幂等执行
pub async fn run_migrations(pool: &PgPool) -> TrackerResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id BIGSERIAL PRIMARY KEY,
            last_name VARCHAR(30) NOT NULL,
            first_name VARCHAR(30) NOT NULL,
            middle_name VARCHAR(30),
            position VARCHAR(100) NOT NULL,
            department VARCHAR(100),
            hired_date DATE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            description TEXT,
            parent_task_id BIGINT REFERENCES tasks(id) ON DELETE SET NULL,
            assigned_to BIGINT REFERENCES employees(id) ON DELETE SET NULL,
            due_date DATE NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'new',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_employees_position ON employees(position)",
        "CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_assigned_to ON tasks(assigned_to)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_parent_task_id ON tasks(parent_task_id)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)",
    ];
    for sql in indexes {
        sqlx::query(sql).execute(pool).await?;
    }

    info!("PostgreSQL数据库迁移完成");
    Ok(())
}
